// ── FlowC Atoms: Traits ────────────────────────────────────────────────────
// Seams between the engine and the network. Each trait has one production
// implementation and is faked in tests.

use crate::atoms::error::ProviderError;
use crate::atoms::types::CompletionRequest;
use async_trait::async_trait;

/// A remote text-completion backend. One call = one attempt; retries,
/// backoff and caching are the gateway's job, never the provider's.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs ("openai", "fake", …).
    fn name(&self) -> &str;

    /// Issue a single completion request and return the completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Source of raw arXiv Atom payloads for a trailing window of `days`.
/// Implementations absorb their own transport failures and return an
/// empty string when nothing could be fetched.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, days: i64) -> String;
}

/// Source of INSPIRE literature search pages. `None` means the page could
/// not be fetched or decoded.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &str,
        size: u32,
        page: u32,
        sort: Option<&str>,
    ) -> Option<serde_json::Value>;
}
