//! Per-chat command handling
//!
//! Each inbound text is first classified into a [`Step`] by a pure function
//! of the text and the chat's current mode, then executed against the
//! corpus, the asset cache and the messenger. Classification order:
//!
//! 1. known `/` commands
//! 2. pending feedback capture
//! 3. display mode keywords
//! 4. navigation keywords
//! 5. explicit `surah:ayah` references
//!
//! Slash-prefixed text that is not a known command falls through, so the
//! `/n` links of the surah index and `/random` keep working.

use crate::assets::{audio_path, image_path, AssetCache, RECITER};
use crate::error::BotResult;
use crate::feedback::FeedbackLog;
use crate::inline::{InlineResponder, INLINE_CACHE_TIME};
use crate::quran::{Quran, VerseRef};
use crate::session::{DisplayMode, Mode, SessionStore, UserState};
use crate::telegram::{
    fit_message, ChatAction, InlineQuery, MediaKind, MediaOptions, Messenger, ParseMode,
    ReplyKeyboardMarkup, Update,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

pub const ABOUT_TEXT: &str = "The English translation is by Imam Ahmed Raza from \
tanzil.net/trans/. The audio is a recitation by Shaykh Mahmoud Khalil al-Husary from \
everyayah.com. The tafsir is Tafsir al-Jalalayn from altafsir.com. The source code of \
BismillahBot is available at: https://github.com/rahiel/BismillahBot.";

pub const FEEDBACK_PROMPT: &str = "Jazak Allahu khayran! Your feedback is highly appreciated \
and will help us improve our services. Your next message will be sent to the developers. \
Send /cancel to cancel.";

pub const CANCELLED_TEXT: &str = "Cancelled.";

pub const FEEDBACK_SAVED_TEXT: &str = "Feedback saved \u{1F60A}";

pub const NOT_FOUND_TEXT: &str = "Ayah does not exist!";

static AYAH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?([0-9]+)[ :\-;.,]*([0-9]*)").expect("ayah pattern is valid"));

/// Extract `(surah, ayah)` from the start of a message such as `2:255`,
/// `/2 255` or `18`; the ayah defaults to 1. Numbers too large for `u32`
/// saturate so they fail the existence check instead of the parse.
pub fn parse_ayah(text: &str) -> Option<(u32, u32)> {
    let captures = AYAH_PATTERN.captures(text)?;
    let number = |s: &str| s.parse::<u32>().unwrap_or(u32::MAX);

    let surah = number(captures.get(1)?.as_str());
    let ayah = match captures.get(2).map(|m| m.as_str()) {
        Some(digits) if !digits.is_empty() => number(digits),
        _ => 1,
    };
    Some((surah, ayah))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    Random,
}

/// What to do with one inbound text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Usage,
    About,
    Index,
    RequestFeedback,
    Cancel,
    /// Store the text as feedback, then restore the given mode
    RecordFeedback(DisplayMode),
    /// Show the current ayah in another mode
    ShowMode(DisplayMode),
    Navigate(Direction),
    /// Explicit reference; may not exist
    GoTo { surah: u32, ayah: u32 },
    Ignore,
}

/// Route a lower-cased message given the chat's current mode
pub fn classify(text: &str, mode: Mode) -> Step {
    if let Some(command) = text.strip_prefix('/') {
        match command {
            "start" | "help" => return Step::Usage,
            "about" => return Step::About,
            "index" => return Step::Index,
            "feedback" => return Step::RequestFeedback,
            "cancel" => return Step::Cancel,
            _ => {}
        }
    }

    if let Mode::Feedback(previous) = mode {
        return Step::RecordFeedback(previous);
    }

    if let Some(mode) = DisplayMode::from_keyword(text) {
        return Step::ShowMode(mode);
    }

    match text {
        "next" => return Step::Navigate(Direction::Next),
        "previous" => return Step::Navigate(Direction::Previous),
        "random" | "/random" => return Step::Navigate(Direction::Random),
        _ => {}
    }

    match parse_ayah(text) {
        Some((surah, ayah)) => Step::GoTo { surah, ayah },
        None => Step::Ignore,
    }
}

/// Keyboard attached to ayahs requested by reference
pub fn navigation_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::from_rows(&[
        &["Arabic", "Audio", "English", "Tafsir"],
        &["Previous", "Random", "Next"],
    ])
}

fn usage_text(bot_username: &str) -> String {
    format!(
        "Send me the numbers of a surah and ayah, for example: <b>2:255</b>. Then I respond \
         with that ayah from the Noble Quran. Type /index to see all Surahs or try /random. \
         I'm available in any chat on Telegram, just type: <b>@{}</b>",
        bot_username
    )
}

/// Handles updates for all chats; holds no per-chat state in memory
pub struct Dispatcher {
    quran: Arc<Quran>,
    index: String,
    usage: String,
    keyboard: ReplyKeyboardMarkup,
    store: SessionStore,
    assets: AssetCache,
    feedback: FeedbackLog,
    inline: InlineResponder,
}

impl Dispatcher {
    pub fn new(
        quran: Arc<Quran>,
        store: SessionStore,
        assets: AssetCache,
        feedback: FeedbackLog,
        bot_username: &str,
    ) -> Self {
        Self {
            index: quran.index(),
            inline: InlineResponder::new(&quran),
            usage: usage_text(bot_username),
            keyboard: navigation_keyboard(),
            quran,
            store,
            assets,
            feedback,
        }
    }

    /// Handle one update: an inline query or a chat message
    pub async fn handle_update(&self, messenger: &dyn Messenger, update: &Update) -> BotResult<()> {
        if let Some(query) = &update.inline_query {
            return self.handle_inline_query(messenger, query).await;
        }

        let Some(message) = &update.message else {
            debug!(update_id = update.update_id, "Update without message");
            return Ok(());
        };

        let Some(text) = &message.text else {
            debug!(chat_id = message.chat.id, "Message without text");
            return Ok(());
        };

        self.handle_message(messenger, message.chat.id, text).await
    }

    async fn handle_inline_query(&self, messenger: &dyn Messenger, query: &InlineQuery) -> BotResult<()> {
        let results = self.inline.answer(&self.quran, &query.query);
        debug!(query = %query.query, results = results.len(), "Answering inline query");
        messenger
            .answer_inline_query(&query.id, &results, INLINE_CACHE_TIME)
            .await?;
        Ok(())
    }

    /// Handle a text message from a chat
    pub async fn handle_message(&self, messenger: &dyn Messenger, chat_id: i64, text: &str) -> BotResult<()> {
        // The bot does not serve groups
        if chat_id < 0 {
            debug!(chat_id, "Ignoring group message");
            return Ok(());
        }

        let message = text.to_lowercase();
        info!(chat_id, text = %message.replace('\n', " "), "Message received");

        let state = self.store.get_user(chat_id).await?;
        let verse = state.verse;

        match classify(&message, state.mode) {
            Step::Usage => self.reply_html(messenger, chat_id, &self.usage).await,
            Step::About => self.reply_html(messenger, chat_id, ABOUT_TEXT).await,
            Step::Index => self.reply_html(messenger, chat_id, &self.index).await,
            Step::RequestFeedback => {
                // A second /feedback keeps the mode to restore
                let pending = Mode::Feedback(state.mode.display());
                self.store.save_user(chat_id, &UserState::new(verse, pending)).await?;
                self.reply_html(messenger, chat_id, FEEDBACK_PROMPT).await
            }
            Step::Cancel => {
                if let Mode::Feedback(previous) = state.mode {
                    let restored = UserState::new(verse, Mode::Display(previous));
                    self.store.save_user(chat_id, &restored).await?;
                }
                self.reply_html(messenger, chat_id, CANCELLED_TEXT).await
            }
            Step::RecordFeedback(previous) => {
                self.feedback.append(chat_id, &message).await?;
                info!(chat_id, "Feedback saved");
                messenger.send_message(chat_id, FEEDBACK_SAVED_TEXT, None, None).await?;
                let restored = UserState::new(verse, Mode::Display(previous));
                self.store.save_user(chat_id, &restored).await?;
                Ok(())
            }
            Step::ShowMode(mode) => self.send_quran(messenger, chat_id, verse, mode, false).await,
            Step::Navigate(direction) => {
                let target = match direction {
                    Direction::Next => verse.next(),
                    Direction::Previous => verse.previous(),
                    Direction::Random => VerseRef::random(&mut rand::thread_rng()),
                };
                self.send_quran(messenger, chat_id, target, state.mode.display(), false)
                    .await
            }
            Step::GoTo { surah, ayah } => match VerseRef::new(surah, ayah) {
                Some(target) => {
                    self.send_quran(messenger, chat_id, target, state.mode.display(), true)
                        .await
                }
                None => {
                    messenger.send_message(chat_id, NOT_FOUND_TEXT, None, None).await?;
                    Ok(())
                }
            },
            Step::Ignore => Ok(()),
        }
    }

    async fn reply_html(&self, messenger: &dyn Messenger, chat_id: i64, text: &str) -> BotResult<()> {
        messenger
            .send_message(chat_id, text, Some(ParseMode::Html), None)
            .await?;
        Ok(())
    }

    /// Deliver an ayah in the given mode and remember it as the chat's position
    async fn send_quran(
        &self,
        messenger: &dyn Messenger,
        chat_id: i64,
        verse: VerseRef,
        mode: DisplayMode,
        with_keyboard: bool,
    ) -> BotResult<()> {
        let keyboard = with_keyboard.then_some(&self.keyboard);

        match mode {
            DisplayMode::Translation | DisplayMode::Commentary => {
                let corpus = if mode == DisplayMode::Translation {
                    &self.quran.translation
                } else {
                    &self.quran.tafsir
                };
                let text = corpus.get_ayah(verse);
                messenger.send_chat_action(chat_id, ChatAction::Typing).await?;
                messenger
                    .send_message(chat_id, fit_message(&text), None, keyboard)
                    .await?;
            }
            DisplayMode::Image => {
                let options = MediaOptions {
                    caption: Some(format!("Quran {}", verse)),
                    reply_markup: keyboard.cloned(),
                    ..Default::default()
                };
                self.send_asset(messenger, chat_id, &image_path(verse), MediaKind::Photo, &options)
                    .await?;
            }
            DisplayMode::Audio => {
                let options = MediaOptions {
                    performer: Some(RECITER.to_string()),
                    title: Some(format!("Quran {}", verse)),
                    reply_markup: keyboard.cloned(),
                    ..Default::default()
                };
                self.send_asset(messenger, chat_id, &audio_path(verse), MediaKind::Audio, &options)
                    .await?;
            }
        }

        self.store
            .save_user(chat_id, &UserState::new(verse, Mode::Display(mode)))
            .await?;
        Ok(())
    }

    async fn send_asset(
        &self,
        messenger: &dyn Messenger,
        chat_id: i64,
        path: &str,
        kind: MediaKind,
        options: &MediaOptions,
    ) -> BotResult<()> {
        messenger.send_chat_action(chat_id, kind.upload_action()).await?;
        self.assets.deliver(messenger, path, kind, chat_id, options).await?;
        Ok(())
    }
}
