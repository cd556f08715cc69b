//! Error types for the Zendesk connector

use thiserror::Error;

/// Errors raised while talking to the Zendesk API
#[derive(Debug, Error)]
pub enum ZendeskError {
    /// Invalid task configuration or rejected credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response was valid JSON but not the shape we expect
    #[error("Data error: {0}")]
    Data(String),

    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-retryable HTTP status
    #[error("[{status}] {body}")]
    Http { status: u16, body: String },

    /// Retryable failure that outlived the retry budget
    #[error("[{status}] temporary failure: {message}")]
    Transient { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Error),
}

impl ZendeskError {
    pub fn is_data(&self) -> bool {
        matches!(self, ZendeskError::Data(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, ZendeskError::Config(_))
    }
}

pub type ZendeskResult<T> = std::result::Result<T, ZendeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ZendeskError::Http {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "[404] Not Found");
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ZendeskError::Data("x".to_string()).is_data());
        assert!(!ZendeskError::Data("x".to_string()).is_config());
        assert!(ZendeskError::Config("x".to_string()).is_config());
    }

    #[test]
    fn test_json_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ZendeskError = parse_err.into();
        assert!(matches!(err, ZendeskError::Json(_)));
    }
}
