use thiserror::Error;

use crate::models::ThreadId;

/// Type alias for Result with FilterError
pub type Result<T> = std::result::Result<T, FilterError>;

/// Error types for thread classification and list maintenance
#[derive(Error, Debug)]
pub enum FilterError {
    /// A user-supplied pattern failed to compile
    #[error("Invalid pattern for {rule}: {message}")]
    InvalidPattern { rule: String, message: String },

    /// A scraped row has no extractable thread id or title
    #[error("Malformed thread row: {0}")]
    MalformedThreadRow(String),

    /// Operation referenced a thread that is not on the current page
    #[error("Unknown thread: {0}")]
    UnknownThread(ThreadId),

    /// Toggle not allowed from the thread's current classification
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// IO error (store and config files)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Persisted state errors
    #[error("State error: {0}")]
    StateError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FilterError::InvalidPattern {
            rule: "HIGHLIGHT_KEYWORDS".to_string(),
            message: "regex parse error".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid pattern"));
        assert!(display.contains("HIGHLIGHT_KEYWORDS"));

        let display = format!("{}", FilterError::UnknownThread(7));
        assert_eq!(display, "Unknown thread: 7");

        let io: FilterError = std::io::Error::new(std::io::ErrorKind::NotFound, "rows.json").into();
        assert!(io.to_string().starts_with("IO error:"));
    }
}
