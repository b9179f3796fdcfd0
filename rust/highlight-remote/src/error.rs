//! Error taxonomy for recognition calls.
//!
//! Every failure is classified as retryable or terminal. The retry executor
//! only retries [RecognitionError::Transport] and [RecognitionError::Server];
//! everything else propagates on the first occurrence.

use thiserror::Error;

/// Errors produced while recognizing entities in a piece of text.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecognitionError {
    /// The request was rejected locally before any network call (empty or
    /// oversized text).
    #[error("Invalid recognition request: {reason}")]
    Validation { reason: String },

    /// The service could not be reached or did not answer in time.
    #[error("Recognition service unreachable: {reason}")]
    Transport { reason: String, timed_out: bool },

    /// The service failed: a 5xx or 429 status, a malformed body, or a soft
    /// failure reported in the response's `error` field.
    #[error("Recognition service failed{}: {message}", status_suffix(.status))]
    Server { status: Option<u16>, message: String },

    /// The service rejected the request (4xx other than 429).
    #[error("Recognition request rejected with HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// The request was superseded by a newer one. Never shown to the user.
    #[error("Recognition request was superseded")]
    Cancelled,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!(" with HTTP {status}"),
        None => String::new(),
    }
}

impl RecognitionError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) && status != 429 {
            RecognitionError::Client { status, message }
        } else {
            RecognitionError::Server {
                status: Some(status),
                message,
            }
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        RecognitionError::Validation {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        RecognitionError::Transport {
            reason: reason.into(),
            timed_out: false,
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        RecognitionError::Transport {
            reason: reason.into(),
            timed_out: true,
        }
    }

    /// A malformed payload or a soft failure signalled by the service.
    pub fn server(message: impl Into<String>) -> Self {
        RecognitionError::Server {
            status: None,
            message: message.into(),
        }
    }

    /// True when another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RecognitionError::Transport { .. } | RecognitionError::Server { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RecognitionError::Cancelled)
    }

    /// The HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecognitionError::Server { status, .. } => *status,
            RecognitionError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RecognitionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RecognitionError::timeout(format!("HTTP request timed out: {error}"))
        } else if error.is_decode() {
            RecognitionError::server(format!("Malformed response body: {error}"))
        } else if let Some(status) = error.status() {
            RecognitionError::from_status(status.as_u16(), error.to_string())
        } else {
            RecognitionError::transport(format!("HTTP request failed: {error}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_classifies_http_statuses() {
        assert!(matches!(
            RecognitionError::from_status(404, "missing"),
            RecognitionError::Client { status: 404, .. }
        ));
        assert!(matches!(
            RecognitionError::from_status(429, "slow down"),
            RecognitionError::Server { status: Some(429), .. }
        ));
        assert!(matches!(
            RecognitionError::from_status(503, "unavailable"),
            RecognitionError::Server { status: Some(503), .. }
        ));
    }

    #[test]
    fn it_marks_only_transient_errors_retryable() {
        assert!(RecognitionError::from_status(500, "boom").is_retryable());
        assert!(RecognitionError::from_status(429, "later").is_retryable());
        assert!(RecognitionError::timeout("30s elapsed").is_retryable());
        assert!(RecognitionError::server("bad json").is_retryable());

        assert!(!RecognitionError::from_status(400, "bad").is_retryable());
        assert!(!RecognitionError::from_status(422, "invalid").is_retryable());
        assert!(!RecognitionError::validation("empty").is_retryable());
        assert!(!RecognitionError::Cancelled.is_retryable());
    }

    #[test]
    fn it_formats_user_visible_messages() {
        assert_eq!(
            RecognitionError::from_status(503, "unavailable").to_string(),
            "Recognition service failed with HTTP 503: unavailable"
        );
        assert_eq!(
            RecognitionError::server("Entity recognition service not available").to_string(),
            "Recognition service failed: Entity recognition service not available"
        );
    }
}
