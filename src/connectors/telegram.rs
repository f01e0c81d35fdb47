// Telegram Bot API sender.
// Messages go out with Markdown parse mode, split below the 4096-char limit.
// A chunk Telegram rejects as bad Markdown is resent once as plain text.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use flowc_core::atoms::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, HTTP_TIMEOUT};
use flowc_core::http::{body_excerpt, build_client, with_linear_retries};
use flowc_core::{EngineError, EngineResult};

use super::Notifier;

const TG_API: &str = "https://api.telegram.org";
const TG_MAX_CHUNK: usize = 4000;

/// Split `text` into chunks of at most `max_len` characters, preferring to
/// break at a newline, then a space.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        // Byte offset of the first char past the limit, if there is one.
        let Some((limit, _)) = remaining.char_indices().nth(max_len) else {
            chunks.push(remaining.to_string());
            break;
        };
        let window = &remaining[..limit];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(limit);
        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }
    chunks
}

pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
    retry_delay: Duration,
}

impl TelegramClient {
    pub fn new(token: Option<&str>, chat_id: Option<&str>) -> EngineResult<Self> {
        let (Some(token), Some(chat_id)) = (
            token.map(str::trim).filter(|t| !t.is_empty()),
            chat_id.map(str::trim).filter(|c| !c.is_empty()),
        ) else {
            return Err(EngineError::Config("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set".into()));
        };
        Ok(TelegramClient {
            client: build_client(HTTP_TIMEOUT),
            base_url: TG_API.to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn post(&self, body: &serde_json::Value) -> EngineResult<reqwest::StatusCode> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!("[telegram] sendMessage HTTP {}: {}", status.as_u16(), body_excerpt(&text, 200));
        }
        Ok(status)
    }

    async fn send_chunk(&self, chunk: &str) -> EngineResult<()> {
        let status = self
            .post(&json!({"chat_id": self.chat_id, "text": chunk, "parse_mode": "Markdown"}))
            .await?;
        if status.is_success() {
            return Ok(());
        }
        if status.as_u16() == 400 {
            // Usually unbalanced Markdown in model output.
            let plain = self.post(&json!({"chat_id": self.chat_id, "text": chunk})).await?;
            if plain.is_success() {
                return Ok(());
            }
        }
        Err(EngineError::delivery("telegram", format!("sendMessage failed: HTTP {}", status.as_u16())))
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> bool {
        let chunks = split_message(text, TG_MAX_CHUNK);
        info!("[telegram] Sending {} chars in {} message(s)", text.chars().count(), chunks.len());
        for chunk in &chunks {
            let chunk = chunk.as_str();
            let sent = with_linear_retries("telegram", DEFAULT_RETRIES, self.retry_delay, move |_| {
                self.send_chunk(chunk)
            })
            .await;
            if sent.is_err() {
                return false;
            }
        }
        true
    }
}
