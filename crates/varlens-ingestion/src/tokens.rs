//! Heuristic token estimation for prompt sizing.
//!
//! Character-ratio estimate with small corrections for whitespace,
//! sentence punctuation and capitalised words. Good enough to warn before a
//! flattened article overruns a model's context window; not a tokenizer.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use varlens_common::VarlensError;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref CAPITALISED: Regex = Regex::new(r"[A-Z][a-z]*").unwrap();
}

const SPECIAL_TOKENS: [&str; 4] = ["<|endoftext|>", "<|im_start|>", "<|im_end|>", "\n"];

/// Kind of text being estimated; selects the tokens-per-character ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    English,
    Chinese,
    Code,
    Json,
}

impl ContentKind {
    pub fn ratio(self) -> f64 {
        match self {
            ContentKind::English => 0.75, // ~4 characters per token
            ContentKind::Chinese => 1.5,
            ContentKind::Code    => 0.8,
            ContentKind::Json    => 0.85,
        }
    }
}

impl FromStr for ContentKind {
    type Err = VarlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" => Ok(ContentKind::English),
            "chinese" => Ok(ContentKind::Chinese),
            "code"    => Ok(ContentKind::Code),
            "json"    => Ok(ContentKind::Json),
            other => Err(VarlensError::InvalidInput(format!(
                "unknown content kind '{}', expected english, chinese, code or json",
                other
            ))),
        }
    }
}

/// Expected completion size relative to the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl CompletionLength {
    pub fn multiplier(self) -> f64 {
        match self {
            CompletionLength::Short  => 0.5,
            CompletionLength::Medium => 1.5,
            CompletionLength::Long   => 3.0,
        }
    }
}

impl FromStr for CompletionLength {
    type Err = VarlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short"  => Ok(CompletionLength::Short),
            "medium" => Ok(CompletionLength::Medium),
            "long"   => Ok(CompletionLength::Long),
            other => Err(VarlensError::InvalidInput(format!(
                "unknown completion length '{}', expected short, medium or long",
                other
            ))),
        }
    }
}

/// Estimated token count of `text`, never less than 1.
pub fn estimate_tokens(text: &str, kind: ContentKind, include_special: bool) -> usize {
    let char_count = text.chars().count() as f64;
    let whitespace_runs = WHITESPACE_RUN.find_iter(text).count() as f64;
    let adjusted = char_count - whitespace_runs * 0.5;

    let mut estimated = (adjusted * kind.ratio()).floor();

    if include_special {
        estimated += SPECIAL_TOKENS
            .iter()
            .map(|token| text.matches(token).count() as f64)
            .sum::<f64>();
    }

    // Periods usually get their own token; capitalised words often split
    estimated += text.matches('.').count() as f64 * 0.5;
    estimated += CAPITALISED.find_iter(text).count() as f64 * 0.2;

    (estimated.floor() as usize).max(1)
}

/// Estimate for a structured value, measured on its compact JSON form.
pub fn estimate_json_tokens(value: &serde_json::Value) -> usize {
    estimate_tokens(&value.to_string(), ContentKind::Json, true)
}

/// `(prompt_tokens, expected_completion_tokens)` for an English prompt.
pub fn estimate_completion(prompt: &str, length: CompletionLength) -> (usize, usize) {
    let prompt_tokens = estimate_tokens(prompt, ContentKind::English, true);
    let completion_tokens = (prompt_tokens as f64 * length.multiplier()).floor() as usize;
    (prompt_tokens, completion_tokens)
}
