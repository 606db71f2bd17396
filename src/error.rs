// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    ConfigMissing(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transient HTTP failure: {0}")]
    TransientHttp(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Max retries exceeded after {attempts} attempts (last error: {last_error})")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("Import failed after {bundles_committed} committed bundle(s): {message}")]
    Import {
        bundles_committed: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Whether the fetcher should back off and try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectorError::TransientHttp(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(ConnectorError::TransientHttp("HTTP 503".to_string()).is_retryable());
        assert!(
            !ConnectorError::HttpStatus {
                status: 400,
                body: "bad".to_string()
            }
            .is_retryable()
        );
        assert!(!ConnectorError::UnexpectedContentType("text/html".to_string()).is_retryable());
    }

    #[test]
    fn test_max_retries_message() {
        let err = ConnectorError::MaxRetriesExceeded {
            attempts: 5,
            last_error: "HTTP 503".to_string(),
        };
        assert!(err.to_string().starts_with("Max retries exceeded"));
    }

    #[test]
    fn test_config_missing_lists_keys() {
        let err = ConnectorError::ConfigMissing(vec![
            "feed.api_key".to_string(),
            "platform.url".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration: feed.api_key, platform.url"
        );
    }
}
