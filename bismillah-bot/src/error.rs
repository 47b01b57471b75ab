//! Error types for bismillah-bot
//!
//! Telegram failures keep their category so the polling loop can decide
//! between pausing, skipping an update, or terminating.

use crate::telegram::TelegramError;
use thiserror::Error;

/// Bot error type
#[derive(Debug, Error)]
pub enum BotError {
    /// Messaging platform failure
    #[error(transparent)]
    Telegram(#[from] TelegramError),

    /// Storage or configuration failure
    #[error("Common error: {0}")]
    Common(#[from] bismillah_common::Error),

    /// IO error (asset or feedback files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus file could not be parsed or failed validation
    #[error("Corpus error: {0}")]
    Corpus(String),
}

/// Result type for bot operations
pub type BotResult<T> = Result<T, BotError>;
