use thiserror::Error;

#[derive(Debug, Error)]
pub enum VarlensError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("No article identifier found in URL: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security policy violation: {0}")]
    SecurityError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VarlensError {
    /// True for failures that happened while talking to a remote host.
    pub fn is_transport(&self) -> bool {
        matches!(self, VarlensError::Http(_) | VarlensError::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, VarlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_names_url() {
        let err = VarlensError::HttpStatus { status: 404, url: "https://pmc.ncbi.nlm.nih.gov/x".into() };
        assert_eq!(err.to_string(), "HTTP 404 returned by https://pmc.ncbi.nlm.nih.gov/x");
        assert!(err.is_transport());
    }

    #[test]
    fn test_identifier_error_is_not_transport() {
        let err = VarlensError::InvalidIdentifier("https://host/no-id-here".into());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("no-id-here"));
    }
}
