//! Judgment-service provider errors

use std::fmt;

/// Errors that can occur while talking to a judgment provider
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// API request failed with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    Other { message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            BackendError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            BackendError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = BackendError::ApiError {
            message: "bad gateway".to_string(),
            status_code: Some(502),
        };
        assert_eq!(err.to_string(), "API error (502): bad gateway");

        let err = BackendError::ApiError {
            message: "connection refused".to_string(),
            status_code: None,
        };
        assert_eq!(err.to_string(), "API error: connection refused");

        let err = BackendError::TimeoutError { seconds: 15 };
        assert_eq!(err.to_string(), "Request timed out after 15 seconds");

        let err = BackendError::Other {
            message: "no scripted response".to_string(),
        };
        assert_eq!(err.to_string(), "Error: no scripted response");
    }
}
