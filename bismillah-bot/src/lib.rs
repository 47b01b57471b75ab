//! bismillah-bot library interface
//!
//! Explore the Noble Qur'an on Telegram: look up ayahs by reference, step
//! through them, and switch between translation, tafsir, Arabic image and
//! recitation.

pub mod assets;
pub mod dispatcher;
pub mod error;
pub mod feedback;
pub mod inline;
pub mod poller;
pub mod quran;
pub mod session;
pub mod telegram;

pub use crate::error::{BotError, BotResult};

/// One-line identification printed at startup
pub fn build_banner() -> String {
    format!(
        "BismillahBot v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}
