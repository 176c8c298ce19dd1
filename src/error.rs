use thiserror::Error;

/// Main error type for the draw tracker
#[derive(Error, Debug)]
pub enum WingoError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Record errors
    #[error("Malformed draw record: {0}")]
    MalformedRecord(#[from] RecordError),

    // Storage errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for WingoError
pub type Result<T> = std::result::Result<T, WingoError>;

/// Reasons a single feed or stored entry is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("non-numeric draw number: {value:?}")]
    NonNumeric { value: String },

    #[error("draw number {value} outside 0..=9")]
    OutOfRange { value: i64 },

    #[error("color is not a string: {value}")]
    InvalidColor { value: String },

    #[error("entry is not an object: {value}")]
    NotAnObject { value: String },
}

impl WingoError {
    /// Whether the poller can simply retry on the next cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WingoError::Http(_) | WingoError::Fetch(_) | WingoError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_converts() {
        let err: WingoError = RecordError::MissingField { field: "issueNumber" }.into();
        assert_eq!(
            err.to_string(),
            "Malformed draw record: missing field: issueNumber"
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn test_fetch_is_transient() {
        assert!(WingoError::Fetch("status 502".into()).is_transient());
        assert!(!WingoError::Persistence("disk full".into()).is_transient());
    }
}
