//! Mail error types.

use thiserror::Error;

/// Result type for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// The HTTP call itself failed (connection, DNS, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The HTTP round trip exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The provider answered, but rejected the message.
    #[error("{provider} rejected the message (HTTP {status}){}", reason_suffix(.message))]
    Rejected {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code of the response.
        status: u16,
        /// Human-readable reason reported by the provider, if any.
        message: Option<String>,
    },

    /// The provider answered with a success status but no body.
    #[error("{provider} returned an empty response (HTTP {status})")]
    EmptyResponse {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code of the response.
        status: u16,
    },

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MailError {
    /// HTTP status code of the provider response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::EmptyResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message reported by the provider, if any.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Check if the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

fn reason_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = MailError::Rejected {
            provider: "Mailgun",
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Mailgun rejected the message (HTTP 500)");
        assert_eq!(err.status(), Some(500));

        let err = MailError::Rejected {
            provider: "SendGrid",
            status: 202,
            message: Some("Invalid API key".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "SendGrid rejected the message (HTTP 202): Invalid API key"
        );
        assert_eq!(err.provider_message(), Some("Invalid API key"));
    }

    #[test]
    fn test_status_only_for_responses() {
        assert_eq!(MailError::Timeout.status(), None);
        assert!(MailError::Timeout.is_transport());
        assert!(MailError::Transport("dns".into()).is_transport());

        let empty = MailError::EmptyResponse {
            provider: "Mailgun",
            status: 200,
        };
        assert_eq!(empty.status(), Some(200));
        assert!(!empty.is_transport());
    }
}
