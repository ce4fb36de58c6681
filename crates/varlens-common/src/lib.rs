//! varlens-common: Shared error type and HTTP plumbing used across all Varlens crates.

pub mod error;
pub mod sandbox;

pub use error::{Result, VarlensError};
pub use sandbox::{ensure_success, HttpSettings, SandboxClient, BROWSER_USER_AGENT};
