//! Per-chat navigation state and file-token persistence
//!
//! User state is stored as a JSON triple `[surah, ayah, "mode"]` under the
//! chat id. While feedback is pending the mode is stored as
//! `feedback:<mode>` so the previous display mode can be restored.

use crate::quran::VerseRef;
use bismillah_common::db::KvStore;
use bismillah_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Retention of user state (about six months)
pub const USER_TTL: Duration = Duration::from_secs(180 * 24 * 60 * 60);

/// Retention of uploaded file tokens (about three months)
pub const FILE_TTL: Duration = Duration::from_secs(8_035_200);

const FEEDBACK_PREFIX: &str = "feedback:";

/// How ayahs are delivered to a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// English translation text
    Translation,
    /// Tafsir al-Jalalayn text
    Commentary,
    /// Rendered Arabic image
    Image,
    /// Recitation audio
    Audio,
}

impl DisplayMode {
    /// Keyword users type (and the persisted name)
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Translation => "english",
            DisplayMode::Commentary => "tafsir",
            DisplayMode::Image => "arabic",
            DisplayMode::Audio => "audio",
        }
    }

    /// Parse a lower-case mode keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "english" => Some(DisplayMode::Translation),
            "tafsir" => Some(DisplayMode::Commentary),
            "arabic" => Some(DisplayMode::Image),
            "audio" => Some(DisplayMode::Audio),
            _ => None,
        }
    }
}

/// Display mode, possibly waiting for one free-text feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Display(DisplayMode),
    Feedback(DisplayMode),
}

impl Mode {
    /// The display mode in effect (or to restore after feedback)
    pub fn display(self) -> DisplayMode {
        match self {
            Mode::Display(mode) | Mode::Feedback(mode) => mode,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Display(DisplayMode::Translation)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Display(mode) => f.write_str(mode.name()),
            Mode::Feedback(mode) => write!(f, "{}{}", FEEDBACK_PREFIX, mode.name()),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("unknown mode {:?}", s));
        match s.strip_prefix(FEEDBACK_PREFIX) {
            Some(inner) => DisplayMode::from_keyword(inner).map(Mode::Feedback).ok_or_else(invalid),
            None => DisplayMode::from_keyword(s).map(Mode::Display).ok_or_else(invalid),
        }
    }
}

impl Serialize for Mode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Navigation state of one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserState {
    pub verse: VerseRef,
    pub mode: Mode,
}

impl UserState {
    pub fn new(verse: VerseRef, mode: Mode) -> Self {
        Self { verse, mode }
    }

    /// Encode as `[surah, ayah, "mode"]`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&(self.verse.surah, self.verse.ayah, self.mode))?)
    }

    /// Decode `[surah, ayah, "mode"]`, rejecting coordinates that do not exist
    pub fn from_json(value: &str) -> Result<Self> {
        let (surah, ayah, mode): (u32, u32, Mode) = serde_json::from_str(value)?;
        let verse = VerseRef::new(surah, ayah)
            .ok_or_else(|| Error::InvalidInput(format!("stored ayah {}:{} does not exist", surah, ayah)))?;
        Ok(Self { verse, mode })
    }
}

/// Typed access to user state and file tokens in the key/value store
#[derive(Clone)]
pub struct SessionStore {
    kv: KvStore,
}

impl SessionStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Stored state for a chat, or the default for first contact
    pub async fn get_user(&self, chat_id: i64) -> Result<UserState> {
        let Some(value) = self.kv.get(&chat_id.to_string()).await? else {
            return Ok(UserState::default());
        };

        match UserState::from_json(&value) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(chat_id, value = %value, error = %e, "Discarding undecodable user state");
                Ok(UserState::default())
            }
        }
    }

    pub async fn save_user(&self, chat_id: i64, state: &UserState) -> Result<()> {
        self.kv.set_ex(&chat_id.to_string(), &state.to_json()?, USER_TTL).await
    }

    /// Cached platform token for a local asset path
    pub async fn get_file(&self, path: &str) -> Result<Option<String>> {
        match self.kv.get(&file_key(path)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_file(&self, path: &str, file_id: &str) -> Result<()> {
        self.kv
            .set_ex(&file_key(path), &serde_json::to_string(file_id)?, FILE_TTL)
            .await
    }
}

fn file_key(path: &str) -> String {
    format!("file:{}", path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bismillah_common::db::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        SessionStore::new(KvStore::new(pool, ""))
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in [
            Mode::Display(DisplayMode::Translation),
            Mode::Display(DisplayMode::Commentary),
            Mode::Display(DisplayMode::Image),
            Mode::Display(DisplayMode::Audio),
            Mode::Feedback(DisplayMode::Audio),
        ] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(Mode::Feedback(DisplayMode::Translation).to_string(), "feedback:english");
    }

    #[test]
    fn test_nested_feedback_is_invalid() {
        assert!("feedback:feedback:english".parse::<Mode>().is_err());
        assert!("klingon".parse::<Mode>().is_err());
    }

    #[test]
    fn test_state_json_format() {
        let state = UserState::new(VerseRef::new(2, 255).unwrap(), Mode::Display(DisplayMode::Commentary));
        assert_eq!(state.to_json().unwrap(), r#"[2,255,"tafsir"]"#);
        assert_eq!(UserState::from_json(r#"[2,255,"tafsir"]"#).unwrap(), state);
    }

    #[test]
    fn test_state_json_rejects_missing_ayah() {
        assert!(UserState::from_json(r#"[1,8,"english"]"#).is_err());
    }

    #[tokio::test]
    async fn test_first_contact_defaults() {
        let store = memory_store().await;
        let state = store.get_user(42).await.unwrap();
        assert_eq!(state.verse, VerseRef::FIRST);
        assert_eq!(state.mode, Mode::Display(DisplayMode::Translation));
    }

    #[tokio::test]
    async fn test_save_and_load_user() {
        let store = memory_store().await;
        let state = UserState::new(VerseRef::new(9, 1).unwrap(), Mode::Feedback(DisplayMode::Image));
        store.save_user(42, &state).await.unwrap();
        assert_eq!(store.get_user(42).await.unwrap(), state);
        assert_eq!(store.get_user(43).await.unwrap(), UserState::default());
    }

    #[tokio::test]
    async fn test_corrupt_state_falls_back_to_default() {
        let store = memory_store().await;
        store.kv.set_ex("42", "not json", USER_TTL).await.unwrap();
        assert_eq!(store.get_user(42).await.unwrap(), UserState::default());
    }

    #[tokio::test]
    async fn test_file_tokens() {
        let store = memory_store().await;
        assert_eq!(store.get_file("Husary/001001.mp3").await.unwrap(), None);

        store.save_file("Husary/001001.mp3", "CQACAg").await.unwrap();
        assert_eq!(
            store.get_file("Husary/001001.mp3").await.unwrap().as_deref(),
            Some("CQACAg")
        );
        assert_eq!(
            store.kv.get("file:Husary/001001.mp3").await.unwrap().as_deref(),
            Some("\"CQACAg\"")
        );
    }
}
