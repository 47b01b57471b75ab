//! Messaging platform integration
//!
//! The rest of the bot talks to Telegram only through the [`Messenger`]
//! trait, so the dispatcher and polling loop can run against a fake.

pub mod client;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::*;

use async_trait::async_trait;

/// Longest text the platform accepts in a message (characters)
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// First `max_chars` characters of `text`
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// `text` cut to [`MAX_MESSAGE_LENGTH`]; sendMessage and inline articles
/// reject anything longer
pub fn fit_message(text: &str) -> &str {
    truncate(text, MAX_MESSAGE_LENGTH)
}

/// Outbound and polling capabilities of the messaging platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Long-poll for updates with `update_id >= offset`
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, TelegramError>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError>;

    /// Send a photo or audio and return the platform's file_id for it
    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file: InputFile,
        options: &MediaOptions,
    ) -> Result<String, TelegramError>;

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
        cache_time: u32,
    ) -> Result<(), TelegramError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ﷺﷺﷺ", 2), "ﷺﷺ");
    }

    #[test]
    fn test_fit_message_limit() {
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 10);
        assert_eq!(fit_message(&long).chars().count(), MAX_MESSAGE_LENGTH);
        assert_eq!(fit_message("short"), "short");
    }
}
