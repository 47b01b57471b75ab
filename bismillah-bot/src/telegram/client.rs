//! Telegram Bot API client
//!
//! Every call is a POST to `https://api.telegram.org/bot<token>/<method>`.
//! The response envelope `{ok, result, description, error_code, parameters}`
//! is decoded here and failures are mapped to [`TelegramError`] categories.

use super::types::{
    ChatAction, InlineQueryResult, InputFile, MediaKind, MediaOptions, ParseMode,
    ReplyKeyboardMarkup, SentMedia, Update,
};
use super::{Messenger, TelegramError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
const USER_AGENT: &str = concat!("BismillahBot/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// Decode a Bot API response body into its result or a classified error
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, TelegramError> {
    let envelope: ApiResponse<T> = serde_json::from_str(body).map_err(|e| {
        TelegramError::InvalidServerResponse(format!("HTTP {}: {}", status, e))
    })?;

    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| TelegramError::InvalidServerResponse("missing result".to_string()));
    }

    Err(TelegramError::from_api(
        envelope.error_code.unwrap_or(i64::from(status)),
        envelope.description.unwrap_or_default(),
        envelope.parameters.and_then(|p| p.retry_after),
    ))
}

/// Telegram Bot API client
pub struct TelegramClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TelegramError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", TELEGRAM_BASE_URL, token),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, TelegramError> {
        self.call_with_timeout(method, params, None).await
    }

    async fn call_with_timeout<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        tracing::trace!(method, "Calling Bot API");

        let mut request = self.http_client.post(self.url(method)).json(&params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }

    async fn upload<T: DeserializeOwned>(&self, method: &str, form: Form) -> Result<T, TelegramError> {
        tracing::debug!(method, "Uploading file to Bot API");

        let response = self.http_client.post(self.url(method)).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

fn media_params(chat_id: i64, options: &MediaOptions) -> Result<Vec<(&'static str, String)>, TelegramError> {
    let mut params = vec![("chat_id", chat_id.to_string())];
    if let Some(caption) = &options.caption {
        params.push(("caption", caption.clone()));
    }
    if let Some(performer) = &options.performer {
        params.push(("performer", performer.clone()));
    }
    if let Some(title) = &options.title {
        params.push(("title", title.clone()));
    }
    if let Some(markup) = &options.reply_markup {
        let encoded = serde_json::to_string(markup)
            .map_err(|e| TelegramError::InvalidServerResponse(e.to_string()))?;
        params.push(("reply_markup", encoded));
    }
    Ok(params)
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let mut params = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "inline_query"],
        });
        if let Some(offset) = offset {
            params["offset"] = json!(offset);
        }

        // The long poll may legitimately take the full timeout
        let http_timeout = Duration::from_secs(timeout_secs + REQUEST_TIMEOUT_SECS);
        self.call_with_timeout("getUpdates", params, Some(http_timeout)).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut params = json!({"chat_id": chat_id, "text": text});
        if let Some(mode) = parse_mode {
            params["parse_mode"] = json!(mode);
        }
        if let Some(markup) = reply_markup {
            params["reply_markup"] = json!(markup);
        }

        let _: Value = self.call("sendMessage", params).await?;
        Ok(())
    }

    async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), TelegramError> {
        let _: bool = self
            .call("sendChatAction", json!({"chat_id": chat_id, "action": action}))
            .await?;
        Ok(())
    }

    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file: InputFile,
        options: &MediaOptions,
    ) -> Result<String, TelegramError> {
        let params = media_params(chat_id, options)?;

        let sent: SentMedia = match file {
            InputFile::FileId(file_id) => {
                let mut body = serde_json::Map::new();
                for (key, value) in params {
                    body.insert(key.to_string(), Value::String(value));
                }
                body.insert(kind.field().to_string(), Value::String(file_id));
                self.call(kind.method(), Value::Object(body)).await?
            }
            InputFile::Upload { file_name, bytes } => {
                let mut form = Form::new();
                for (key, value) in params {
                    form = form.text(key, value);
                }
                form = form.part(kind.field(), Part::bytes(bytes).file_name(file_name));
                self.upload(kind.method(), form).await?
            }
        };

        sent.file_id(kind).ok_or_else(|| {
            TelegramError::InvalidServerResponse(format!("{} result without file_id", kind.method()))
        })
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
        cache_time: u32,
    ) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerInlineQuery",
                json!({
                    "inline_query_id": inline_query_id,
                    "results": results,
                    "cache_time": cache_time,
                }),
            )
            .await?;
        Ok(())
    }
}
