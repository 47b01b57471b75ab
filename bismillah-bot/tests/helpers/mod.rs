//! Test helpers for bismillah-bot integration tests
//!
//! Provides:
//! - FakeMessenger: records every outbound call and plays back scripted failures
//! - Synthetic corpus: every ayah's text is `<variant> s:a`
//! - TestBot: a dispatcher over an in-memory session store and a temp asset folder

#![allow(dead_code)]

pub mod fake_messenger;

pub use fake_messenger::{Call, FakeMessenger};

use bismillah_bot::assets::AssetCache;
use bismillah_bot::dispatcher::Dispatcher;
use bismillah_bot::feedback::FeedbackLog;
use bismillah_bot::quran::{Corpus, Quran, VerseRef, SURAH_LENGTHS};
use bismillah_bot::session::{DisplayMode, Mode, SessionStore, UserState};
use bismillah_common::db::{create_schema, KvStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const CHAT_ID: i64 = 42;

/// Surah/ayah table where every text names its own coordinate
pub fn synthetic_surahs(variant: &str) -> Vec<Vec<String>> {
    SURAH_LENGTHS
        .iter()
        .enumerate()
        .map(|(s, &len)| (1..=len).map(|a| format!("{} {}:{}", variant, s + 1, a)).collect())
        .collect()
}

pub fn surah_names() -> Vec<String> {
    (1..=114).map(|i| format!("Surah {}", i)).collect()
}

pub fn synthetic_quran() -> Quran {
    quran_from(synthetic_surahs("english"), synthetic_surahs("tafsir"))
}

pub fn quran_from(translation: Vec<Vec<String>>, tafsir: Vec<Vec<String>>) -> Quran {
    Quran {
        translation: Corpus::from_surahs(translation).expect("valid translation"),
        tafsir: Corpus::from_surahs(tafsir).expect("valid tafsir"),
        surah_names: surah_names(),
    }
}

/// Session store over a private in-memory database
pub async fn memory_store() -> SessionStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    create_schema(&pool).await.expect("schema");
    SessionStore::new(KvStore::new(pool, "test"))
}

pub fn verse(surah: u32, ayah: u32) -> VerseRef {
    VerseRef::new(surah, ayah).expect("verse exists")
}

pub fn state(surah: u32, ayah: u32, mode: DisplayMode) -> UserState {
    UserState::new(verse(surah, ayah), Mode::Display(mode))
}

/// A dispatcher wired to a fake messenger
pub struct TestBot {
    pub dispatcher: Dispatcher,
    pub messenger: FakeMessenger,
    pub store: SessionStore,
    pub dir: TempDir,
}

impl TestBot {
    pub async fn new() -> Self {
        Self::with_quran(synthetic_quran()).await
    }

    pub async fn with_quran(quran: Quran) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = memory_store().await;
        let assets = AssetCache::new(store.clone(), dir.path().to_path_buf());
        let feedback = FeedbackLog::new(dir.path().join("feedback.txt"));
        let dispatcher = Dispatcher::new(Arc::new(quran), store.clone(), assets, feedback, "BismillahBot");

        Self {
            dispatcher,
            messenger: FakeMessenger::new(),
            store,
            dir,
        }
    }

    /// Deliver a text message from the default private chat
    pub async fn send(&self, text: &str) {
        self.send_from(CHAT_ID, text).await;
    }

    pub async fn send_from(&self, chat_id: i64, text: &str) {
        self.dispatcher
            .handle_message(&self.messenger, chat_id, text)
            .await
            .expect("message handled");
    }

    pub async fn set_state(&self, state: UserState) {
        self.store.save_user(CHAT_ID, &state).await.expect("state saved");
    }

    pub async fn state(&self) -> UserState {
        self.store.get_user(CHAT_ID).await.expect("state loaded")
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.dir.path().join("feedback.txt")
    }

    /// Create an asset file below the temp asset root
    pub fn write_asset(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        write_file(self.dir.path(), relative, bytes)
    }
}

pub fn write_file(root: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("asset dir");
    }
    std::fs::write(&path, bytes).expect("asset written");
    path
}
