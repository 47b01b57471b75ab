//! Telegram failure categories

use std::time::Duration;
use thiserror::Error;

/// Telegram client errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not a Bot API envelope
    #[error("Invalid server response: {0}")]
    InvalidServerResponse(String),

    /// Flood control; retry after the given number of seconds
    #[error("Too many requests, retry after {0}s")]
    RetryAfter(u64),

    /// The user blocked the bot or deleted the chat
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A cached file_id is no longer accepted
    #[error("Invalid file reference: {0}")]
    InvalidFileReference(String),

    /// Any other API error; not recoverable
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },
}

impl TelegramError {
    /// Classify an error envelope returned by the Bot API
    pub fn from_api(code: i64, description: String, retry_after: Option<u64>) -> Self {
        if let Some(secs) = retry_after {
            return TelegramError::RetryAfter(secs);
        }
        if code == 403 {
            return TelegramError::Unauthorized(description);
        }
        let lower = description.to_lowercase();
        if lower.contains("file_id") || lower.contains("file identifier") {
            return TelegramError::InvalidFileReference(description);
        }
        if code >= 500 {
            return TelegramError::InvalidServerResponse(description);
        }
        TelegramError::Api { code, description }
    }

    /// Pause before polling again, `None` if the error is not transient
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            TelegramError::Network(_) => Some(Duration::from_secs(1)),
            TelegramError::InvalidServerResponse(_) => Some(Duration::from_secs(3)),
            TelegramError::RetryAfter(secs) => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TelegramError::InvalidServerResponse(err.to_string())
        } else {
            TelegramError::Network(err.to_string())
        }
    }
}
