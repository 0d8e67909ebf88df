use thiserror::Error;

#[derive(Debug, Error)]
pub enum PubgraphError {
    /// Trimmed input was not a run of decimal digits.
    #[error("{0} is not a proper PMID")]
    InvalidPmid(String),

    /// Identifier arrived as a JSON value of the wrong type.
    #[error("PMID requires a String, got {0}")]
    RequiresString(String),

    #[error("No catalog record for PMID {0}")]
    NotFound(String),

    /// The bibliographic service broke its data-shape contract.
    /// Callers are not expected to recover from this.
    #[error("Upstream contract violated: {0}")]
    UpstreamContract(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PubgraphError {
    /// True when the catalog has no record for the requested PMID.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PubgraphError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PubgraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pmid_message_carries_input() {
        let err = PubgraphError::InvalidPmid("456fahehe123".to_string());
        assert_eq!(err.to_string(), "456fahehe123 is not a proper PMID");
    }

    #[test]
    fn test_requires_string_message() {
        let err = PubgraphError::RequiresString("number".to_string());
        assert!(err.to_string().contains("requires a String"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing fixture");
        let err: PubgraphError = io_err.into();
        assert!(matches!(err, PubgraphError::Io(_)));
        assert!(!err.is_not_found());
        assert!(PubgraphError::NotFound("17284678".to_string()).is_not_found());
    }
}
