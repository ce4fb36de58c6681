//! Genomic position descriptors (`chr-position-ref-alt`).
//!
//! # Example
//! ```ignore
//! let pos: GenomicPosition = "chr2-31754395-C-T".parse()?;
//! assert_eq!(pos.chromosome, "2");
//! assert_eq!(pos.to_string(), "chr2-31754395-C-T");
//! ```

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use varlens_common::VarlensError;

lazy_static! {
    // chr prefix optional; chromosome 1-22, X, Y, M or MT; alleles over ACGTN
    static ref POSITION: Regex = Regex::new(
        r"^(?i)(?:chr)?([0-9]{1,2}|X|Y|MT|M)[-:](\d+)-([ACGTN]+)-([ACGTN]+)$"
    ).unwrap();
}

/// Reference genome build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenomeBuild {
    Hg19,
    Hg38,
}

impl GenomeBuild {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeBuild::Hg19 => "hg19",
            GenomeBuild::Hg38 => "hg38",
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenomeBuild {
    type Err = VarlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hg19" | "grch37" => Ok(GenomeBuild::Hg19),
            "hg38" | "grch38" => Ok(GenomeBuild::Hg38),
            other => Err(VarlensError::InvalidInput(format!(
                "unknown genome build '{}', expected hg19 or hg38",
                other
            ))),
        }
    }
}

/// A single small variant on a reference chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomicPosition {
    /// Without the `chr` prefix, upper case for X/Y/M/MT.
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}

impl GenomicPosition {
    pub fn parse(raw: &str) -> Result<Self, VarlensError> {
        let raw = raw.trim();
        let invalid = || VarlensError::InvalidInput(format!(
            "'{}' is not a chr-position-ref-alt descriptor (e.g. chr2-31754395-C-T)",
            raw
        ));

        let caps = POSITION.captures(raw).ok_or_else(invalid)?;
        let chromosome = caps[1].to_uppercase();
        if let Ok(n) = chromosome.parse::<u8>() {
            if !(1..=22).contains(&n) {
                return Err(invalid());
            }
        }
        let position: u64 = caps[2].parse().map_err(|_| invalid())?;
        if position == 0 {
            return Err(invalid());
        }

        Ok(Self {
            chromosome: chromosome.trim_start_matches('0').to_string(),
            position,
            reference: caps[3].to_uppercase(),
            alternate: caps[4].to_uppercase(),
        })
    }
}

impl FromStr for GenomicPosition {
    type Err = VarlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GenomicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chr{}-{}-{}-{}", self.chromosome, self.position, self.reference, self.alternate)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_descriptor() {
        let pos = GenomicPosition::parse("chr2-31754395-C-T").unwrap();
        assert_eq!(pos.chromosome, "2");
        assert_eq!(pos.position, 31_754_395);
        assert_eq!(pos.reference, "C");
        assert_eq!(pos.alternate, "T");
        assert_eq!(pos.to_string(), "chr2-31754395-C-T");
    }

    #[test]
    fn test_parse_normalises_case_and_prefix() {
        let pos: GenomicPosition = "x-100-acg-a".parse().unwrap();
        assert_eq!(pos.to_string(), "chrX-100-ACG-A");
        let pos: GenomicPosition = "chrMT:73-A-G".parse().unwrap();
        assert_eq!(pos.chromosome, "MT");
        let pos: GenomicPosition = "chr07-5-C-G".parse().unwrap();
        assert_eq!(pos.chromosome, "7");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "chr2-31754395-C", "chr23-1-A-T", "chr0-1-A-T", "chr1-0-A-T", "chr1-5-A-Z", "BRCA1 c.68_69del"] {
            assert!(GenomicPosition::parse(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_genome_build_names() {
        assert_eq!("hg38".parse::<GenomeBuild>().unwrap(), GenomeBuild::Hg38);
        assert_eq!("GRCh37".parse::<GenomeBuild>().unwrap(), GenomeBuild::Hg19);
        assert!("hg18".parse::<GenomeBuild>().is_err());
        assert_eq!(serde_json::to_string(&GenomeBuild::Hg19).unwrap(), "\"hg19\"");
    }
}
