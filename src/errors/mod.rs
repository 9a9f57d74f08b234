use thiserror::Error;

/// Shown when a write fails and the server gave no usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures talking to the tournament API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation { message: String },

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message for write paths: the server's own wording when it sent one
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation { message } | ClientError::Server { message, .. }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to local storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Failed to {} session storage for key: {}", operation, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_surfaced() {
        let err = ClientError::Validation {
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn blank_or_missing_messages_fall_back() {
        let blank = ClientError::Server {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            ClientError::NotFound("/users/9".to_string()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
