//! Image and audio delivery through the platform's file cache
//!
//! Telegram keeps every uploaded file and hands back a file_id that can be
//! resent without transferring the bytes again. The file_id is stored per
//! local asset path; the file is read from disk only when no token is known
//! or the known token has gone stale.

use crate::error::BotResult;
use crate::quran::VerseRef;
use crate::session::SessionStore;
use crate::telegram::{InputFile, MediaKind, MediaOptions, Messenger, TelegramError};
use std::path::PathBuf;
use tracing::{debug, info};

/// Reciter credited on audio messages
pub const RECITER: &str = "Shaykh Mahmoud Khalil al-Husary";

/// Recitation file for an ayah, e.g. `Husary/002255.mp3`
pub fn audio_path(verse: VerseRef) -> String {
    format!("Husary/{:03}{:03}.mp3", verse.surah, verse.ayah)
}

/// Rendered Arabic image for an ayah, e.g. `quran_images/2_255.png`
pub fn image_path(verse: VerseRef) -> String {
    format!("quran_images/{}_{}.png", verse.surah, verse.ayah)
}

/// Delivers local assets, uploading each one at most once per token lifetime
#[derive(Clone)]
pub struct AssetCache {
    store: SessionStore,
    asset_root: PathBuf,
}

impl AssetCache {
    pub fn new(store: SessionStore, asset_root: PathBuf) -> Self {
        Self { store, asset_root }
    }

    /// Send the asset at `path` (relative to the asset root) to a chat
    ///
    /// A cached token is tried first. If the platform reports it stale the
    /// asset is uploaded once from disk; any other failure is returned.
    /// The token in effect after delivery is stored and returned.
    pub async fn deliver(
        &self,
        messenger: &dyn Messenger,
        path: &str,
        kind: MediaKind,
        chat_id: i64,
        options: &MediaOptions,
    ) -> BotResult<String> {
        if let Some(file_id) = self.store.get_file(path).await? {
            match messenger
                .send_media(chat_id, kind, InputFile::FileId(file_id), options)
                .await
            {
                Ok(file_id) => {
                    self.store.save_file(path, &file_id).await?;
                    debug!(path, "Delivered asset from platform cache");
                    return Ok(file_id);
                }
                Err(TelegramError::InvalidFileReference(reason)) => {
                    info!(path, reason = %reason, "Cached file_id rejected, uploading again");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.upload_from_disk(messenger, path, kind, chat_id, options).await
    }

    async fn upload_from_disk(
        &self,
        messenger: &dyn Messenger,
        path: &str,
        kind: MediaKind,
        chat_id: i64,
        options: &MediaOptions,
    ) -> BotResult<String> {
        let full_path = self.asset_root.join(path);
        let bytes = tokio::fs::read(&full_path).await?;
        let file_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        let file_id = messenger
            .send_media(chat_id, kind, InputFile::Upload { file_name, bytes }, options)
            .await?;

        self.store.save_file(path, &file_id).await?;
        info!(path, file_id = %file_id, "Uploaded asset");
        Ok(file_id)
    }
}
