//! Bot API objects (the subset the bot reads and writes)

use serde::{Deserialize, Serialize};

/// One entry of a getUpdates batch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    /// Absent for stickers, photos, service messages, ...
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    /// Negative for groups and channels
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InlineQuery {
    pub id: String,
    pub query: String,
}

/// Text formatting mode for outgoing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// Custom reply keyboard shown under the input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

impl ReplyKeyboardMarkup {
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|text| KeyboardButton {
                            text: text.to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

/// Presence indicator shown while a reply is being prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    UploadAudio,
}

/// Inline query answer entry (articles only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineQueryResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub title: String,
    pub description: String,
    pub input_message_content: InputTextMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputTextMessageContent {
    pub message_text: String,
}

impl InlineQueryResult {
    pub fn article(id: String, title: String, description: String, text: String) -> Self {
        Self {
            kind: "article",
            id,
            title,
            description,
            input_message_content: InputTextMessageContent { message_text: text },
        }
    }
}

/// Binary asset categories the bot can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Audio,
}

impl MediaKind {
    /// Bot API method name
    pub fn method(self) -> &'static str {
        match self {
            MediaKind::Photo => "sendPhoto",
            MediaKind::Audio => "sendAudio",
        }
    }

    /// Form field carrying the file
    pub fn field(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Audio => "audio",
        }
    }

    pub fn upload_action(self) -> ChatAction {
        match self {
            MediaKind::Photo => ChatAction::UploadPhoto,
            MediaKind::Audio => ChatAction::UploadAudio,
        }
    }
}

/// File to send: a cached file_id or a fresh upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFile {
    FileId(String),
    Upload { file_name: String, bytes: Vec<u8> },
}

/// Optional metadata accompanying a photo or audio
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOptions {
    pub caption: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

/// Sent message as returned by sendPhoto / sendAudio
#[derive(Debug, Clone, Deserialize)]
pub struct SentMedia {
    #[serde(default)]
    pub photo: Option<Vec<FileRef>>,
    #[serde(default)]
    pub audio: Option<FileRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub file_id: String,
}

impl SentMedia {
    /// file_id of the delivered asset; for photos the largest size is last
    pub fn file_id(&self, kind: MediaKind) -> Option<String> {
        match kind {
            MediaKind::Photo => self.photo.as_ref()?.last().map(|f| f.file_id.clone()),
            MediaKind::Audio => self.audio.as_ref().map(|f| f.file_id.clone()),
        }
    }
}
