//! varlens-llm: LLM backend abstraction, model aliases and prompt templates
//! for the interpretation workflows.

pub mod backend;
pub mod interpret;
pub mod prompt;
pub mod router;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use interpret::{Interpreter, SamplingSettings};
pub use prompt::PromptTemplate;
pub use router::{build_backend, build_backend_with, resolve_alias, ModelAlias};
