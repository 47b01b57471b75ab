//! In-process stand-in for the Telegram Bot API

use async_trait::async_trait;
use bismillah_bot::telegram::{
    ChatAction, InlineQueryResult, InputFile, MediaKind, MediaOptions, Messenger, ParseMode,
    ReplyKeyboardMarkup, TelegramError, Update,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One recorded outbound call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetUpdates {
        offset: Option<i64>,
    },
    Message {
        chat_id: i64,
        text: String,
        parse_mode: Option<ParseMode>,
        keyboard: Option<ReplyKeyboardMarkup>,
    },
    ChatAction {
        chat_id: i64,
        action: ChatAction,
    },
    Media {
        chat_id: i64,
        kind: MediaKind,
        file: InputFile,
        options: MediaOptions,
    },
    InlineAnswer {
        inline_query_id: String,
        results: Vec<InlineQueryResult>,
        cache_time: u32,
    },
}

#[derive(Default)]
pub struct FakeMessenger {
    calls: Mutex<Vec<Call>>,
    batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
    stale_file_ids: Mutex<HashSet<String>>,
    blocked_chats: Mutex<HashSet<i64>>,
    next_media_error: Mutex<Option<TelegramError>>,
    uploads: Mutex<u32>,
    drained: Arc<Notify>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Texts of every sendMessage call, in order
    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_message(&self) -> Option<Call> {
        self.calls()
            .into_iter()
            .rev()
            .find(|call| matches!(call, Call::Message { .. }))
    }

    pub fn media(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Media { .. }))
            .collect()
    }

    /// Queue the result of the next getUpdates call
    pub fn push_batch(&self, batch: Result<Vec<Update>, TelegramError>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    /// Reject this file_id as if the platform had forgotten it
    pub fn expire_file_id(&self, file_id: &str) {
        self.stale_file_ids.lock().unwrap().insert(file_id.to_string());
    }

    /// Fail every send to this chat as if the user blocked the bot
    pub fn block_chat(&self, chat_id: i64) {
        self.blocked_chats.lock().unwrap().insert(chat_id);
    }

    pub fn fail_next_media(&self, error: TelegramError) {
        *self.next_media_error.lock().unwrap() = Some(error);
    }

    /// Notified whenever getUpdates finds no scripted batch left
    pub fn drained(&self) -> Arc<Notify> {
        self.drained.clone()
    }

    pub fn upload_count(&self) -> u32 {
        *self.uploads.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_blocked(&self, chat_id: i64) -> Result<(), TelegramError> {
        if self.blocked_chats.lock().unwrap().contains(&chat_id) {
            return Err(TelegramError::Unauthorized(
                "Forbidden: bot was blocked by the user".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn get_updates(&self, offset: Option<i64>, _timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.record(Call::GetUpdates { offset });
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                self.drained.notify_one();
                tokio::task::yield_now().await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        self.check_blocked(chat_id)?;
        self.record(Call::Message {
            chat_id,
            text: text.to_string(),
            parse_mode,
            keyboard: reply_markup.cloned(),
        });
        Ok(())
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError> {
        self.check_blocked(chat_id)?;
        self.record(Call::ChatAction { chat_id, action });
        Ok(())
    }

    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file: InputFile,
        options: &MediaOptions,
    ) -> Result<String, TelegramError> {
        self.check_blocked(chat_id)?;
        self.record(Call::Media {
            chat_id,
            kind,
            file: file.clone(),
            options: options.clone(),
        });

        if let Some(error) = self.next_media_error.lock().unwrap().take() {
            return Err(error);
        }

        match file {
            InputFile::FileId(file_id) => {
                if self.stale_file_ids.lock().unwrap().contains(&file_id) {
                    return Err(TelegramError::InvalidFileReference(
                        "Bad Request: wrong file identifier/HTTP URL specified".to_string(),
                    ));
                }
                Ok(file_id)
            }
            InputFile::Upload { .. } => {
                let mut uploads = self.uploads.lock().unwrap();
                *uploads += 1;
                Ok(format!("uploaded-{}", *uploads))
            }
        }
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
        cache_time: u32,
    ) -> Result<(), TelegramError> {
        self.record(Call::InlineAnswer {
            inline_query_id: inline_query_id.to_string(),
            results: results.to_vec(),
            cache_time,
        });
        Ok(())
    }
}
