// ── FlowC Atoms: Errors ────────────────────────────────────────────────────
// `EngineError` is what fallible setup and storage calls return. Remote
// calls inside a flow rarely surface it: they retry, then degrade to a
// fallback value. Completion backends report the narrower `ProviderError`,
// which never leaves the gateway.
//
// Only `Config` is fatal. Messages never include tokens or passwords.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Cache, archive or history file could not be read or written.
    #[error("filesystem: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport: {0}")]
    Http(#[from] reqwest::Error),

    /// Seen-paper archive or hot-paper pool.
    #[error("local store: {0}")]
    Store(#[from] rusqlite::Error),

    /// A source we read from (arXiv, INSPIRE) answered with an error.
    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    /// A channel we deliver to (Notion, Telegram, SMTP) refused the message.
    #[error("{channel} delivery failed: {message}")]
    Delivery { channel: String, message: String },

    /// Missing or unusable credential/setting, detected at construction.
    #[error("configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream { service: service.into(), message: message.into() }
    }

    pub fn delivery(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery { channel: channel.into(), message: message.into() }
    }

    /// True for errors that must stop the process instead of degrading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Config(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

// ── Completion backend errors ──────────────────────────────────────────────
// Every variant counts as one failed attempt in the gateway; none is
// surfaced to flows.

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection refused, timeout, TLS failure, body read failure.
    #[error("transport: {0}")]
    Transport(String),

    /// Non-2xx response from the remote API.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 401 / 403: the key is wrong or revoked.
    #[error("rejected credentials: {0}")]
    Auth(String),

    /// Well-formed response whose completion text is empty.
    #[error("empty completion")]
    EmptyResponse,

    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_is_fatal() {
        assert!(EngineError::Config("NOTION_TOKEN not set".into()).is_fatal());
        assert!(!EngineError::upstream("arxiv", "timeout").is_fatal());
        assert!(!EngineError::delivery("telegram", "chat not found").is_fatal());
    }

    #[test]
    fn display_includes_context() {
        let e = EngineError::delivery("telegram", "chat not found");
        assert_eq!(e.to_string(), "telegram delivery failed: chat not found");
        let e = EngineError::upstream("inspire", "HTTP 502");
        assert_eq!(e.to_string(), "inspire request failed: HTTP 502");
        let p = ProviderError::Api { status: 503, message: "busy".into() };
        assert_eq!(p.to_string(), "API error 503: busy");
    }
}
