// ── FlowC Atoms: Data Types ────────────────────────────────────────────────

use crate::atoms::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TEMPERATURE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Completion request ─────────────────────────────────────────────────────

/// Everything a provider needs for one completion. Built per call, so two
/// callers can use different models without touching shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        CompletionRequest {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Retry / cache policy for a single `ask`.
#[derive(Debug, Clone, PartialEq)]
pub struct AskOptions {
    /// Total attempts, not extra attempts. Zero is treated as one.
    pub retries: u32,
    /// Base delay; attempt `n` waits `retry_delay * n` after failing.
    pub retry_delay: Duration,
    /// Returned verbatim once every attempt has failed.
    pub fallback: String,
    /// Cache freshness window. `None` or zero disables the cache for this call.
    pub ttl: Option<Duration>,
    pub use_cache: bool,
}

impl Default for AskOptions {
    fn default() -> Self {
        AskOptions {
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            fallback: String::new(),
            ttl: None,
            use_cache: true,
        }
    }
}

impl AskOptions {
    pub fn cached(ttl: Duration) -> Self {
        AskOptions { ttl: Some(ttl), ..Default::default() }
    }

    pub fn uncached() -> Self {
        AskOptions { use_cache: false, ..Default::default() }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_retries(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Whether this call reads and writes the response cache.
    pub fn caching_enabled(&self) -> bool {
        self.use_cache && self.ttl.is_some_and(|t| !t.is_zero())
    }
}

// ── Papers ─────────────────────────────────────────────────────────────────

/// One arXiv entry as parsed from the feed. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Feed-assigned permanent identifier (the Atom `<id>` URL).
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Normalised to UTC; `None` when the feed omitted or garbled it.
    pub updated: Option<DateTime<Utc>>,
}

/// Row of the append-only `papers` archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenPaper {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub created_at: String,
}

/// Row of the `hot_paper_pool` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPaper {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub year: Option<i32>,
    pub arxiv: Option<String>,
    pub created_at: String,
    pub used: bool,
}

/// Pool occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub unused: usize,
    pub used: usize,
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
