//! Completion provider errors.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a completion request failed.
///
/// Nothing here is retried; callers decide whether a failure is local to one
/// case or fatal to the command.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Non-success status without a decodable API error body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Error reported by the provider in its own error envelope.
    #[error("API error: {message}{}", code_suffix(.code))]
    Api {
        /// Provider message.
        message: String,
        /// Provider error code (`invalid_request_error`, ...).
        code: Option<String>,
    },

    /// No answer within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Provider asked us to slow down.
    #[error("rate limited{}", RetryHint(.retry_after))]
    RateLimited {
        /// Delay from the `retry-after` header.
        retry_after: Option<Duration>,
    },

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Unknown model or endpoint.
    #[error("model not found: {0}")]
    NotFound(String),

    /// Transport failure before a response arrived.
    #[error("connection error: {0}")]
    Connection(String),

    /// Provider refused to answer.
    #[error("content filtered: {0}")]
    ContentFiltered(String),

    /// Client set up incorrectly (missing credentials, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

struct RetryHint<'a>(&'a Option<Duration>);

impl fmt::Display for RetryHint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(delay) => write!(f, ", retry after {}s", delay.as_secs()),
            None => Ok(()),
        }
    }
}

impl ModelError {
    /// Create an API error without a code.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create a rate-limited error.
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_display_with_code() {
        let err = ModelError::Api {
            message: "model overloaded".into(),
            code: Some("server_error".into()),
        };
        assert_eq!(err.to_string(), "API error: model overloaded (server_error)");
        assert_eq!(ModelError::api("nope").to_string(), "API error: nope");
    }

    #[test]
    fn test_rate_limited_display() {
        assert_eq!(
            ModelError::rate_limited(Some(Duration::from_secs(7))).to_string(),
            "rate limited, retry after 7s"
        );
        assert_eq!(ModelError::rate_limited(None).to_string(), "rate limited");
    }

    #[test]
    fn test_http_display() {
        assert_eq!(ModelError::http(503, "unavailable").to_string(), "HTTP 503: unavailable");
    }
}
