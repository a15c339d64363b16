//! Error types for paperscope.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the OpenAlex API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400/403 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Over-capacity rejections from local state owners.
///
/// These reject the specific action and leave prior state untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// Pin collection is full
    #[error("Pin limit reached: at most {max} papers can be pinned")]
    PinLimit {
        /// Maximum pinned papers
        max: usize,
    },

    /// Journal filter set is full
    #[error("Journal filter limit reached: at most {max} journals can be selected")]
    JournalLimit {
        /// Maximum journals in a filter set
        max: usize,
    },
}

impl CapacityError {
    /// Convert to a user-visible, count-based message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::PinLimit { max } => {
                format!("You can pin up to {max} papers. Unpin one to make room.")
            }
            Self::JournalLimit { max } => {
                format!("You can filter by up to {max} journals at once.")
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("W123");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_capacity_error_user_message() {
        let err = CapacityError::PinLimit { max: 100 };
        assert!(err.to_user_message().contains("100"));

        let err = CapacityError::JournalLimit { max: 20 };
        assert!(err.to_user_message().contains("20"));
    }
}
