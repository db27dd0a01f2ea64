use thiserror::Error;

/// Core error type for the Lexibase engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record store failure
    #[error("Store error: {0}")]
    StoreError(String),

    /// Input rejected before reaching the store
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Media file copy/removal failure
    #[error("Media error: {0}")]
    MediaError(String),

    /// Edit session used outside its allowed state
    #[error("Session error: {0}")]
    SessionError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::MediaError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::NotFound("entry 7".to_string()), "Not found: entry 7"),
            (CoreError::StoreError("db_err".to_string()), "Store error: db_err"),
            (
                CoreError::ValidationError("invalid".to_string()),
                "Validation error: invalid",
            ),
            (
                CoreError::MediaError("copy failed".to_string()),
                "Media error: copy failed",
            ),
            (
                CoreError::SessionError("not editing".to_string()),
                "Session error: not editing",
            ),
            (CoreError::Other("other_err".to_string()), "other_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error: CoreError = io_error.into();

        match error {
            CoreError::MediaError(msg) => {
                assert!(msg.contains("file not found"));
            }
            _ => panic!("Expected MediaError variant"),
        }
    }

    #[test]
    fn test_from_string() {
        let error: CoreError = "test error message".to_string().into();

        match error {
            CoreError::Other(msg) => {
                assert_eq!(msg, "test error message");
            }
            _ => panic!("Expected Other variant"),
        }
    }
}
