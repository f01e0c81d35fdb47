// FlowC Engine: Resilient AI Gateway
//
// Wraps a CompletionProvider with:
//   • response cache lookup (only when use_cache && ttl > 0)
//   • up to `retries` attempts with linear backoff (delay × attempt)
//   • empty completions counted as failures and retried
//   • a caller-supplied fallback string once every attempt has failed
//
// `ask` never returns an error: callers always get a usable string.

use log::{debug, error};

use crate::atoms::error::ProviderError;
use crate::atoms::types::{AskOptions, CompletionRequest};
use crate::cache::ResponseCache;
use crate::http::with_linear_retries;
use crate::providers::AnyProvider;

pub struct AiGateway {
    provider: AnyProvider,
    cache: Option<ResponseCache>,
}

impl AiGateway {
    pub fn new(provider: AnyProvider, cache: Option<ResponseCache>) -> Self {
        AiGateway { provider, cache }
    }

    /// Ask for a completion, consulting and filling the cache when the
    /// options allow it. Returns `options.fallback` after exhaustion.
    pub async fn ask(&self, request: &CompletionRequest, options: &AskOptions) -> String {
        let cache = self.cache.as_ref().filter(|_| options.caching_enabled());

        if let Some(cache) = cache {
            if let Some(hit) = cache.get(&request.model, &request.prompt, options.ttl) {
                debug!("[ai] cache hit model={}", request.model);
                return hit;
            }
        }

        let provider = &self.provider;
        let result = with_linear_retries("ai", options.retries, options.retry_delay, move |_| async move {
            let text = provider.complete(request).await?;
            if text.trim().is_empty() {
                return Err(ProviderError::EmptyResponse);
            }
            Ok(text)
        })
        .await;

        match result {
            Ok(text) => {
                if let Some(cache) = cache {
                    cache.set(&request.model, &request.prompt, &text);
                }
                text
            }
            Err(e) => {
                error!(
                    "[ai] {} model={} failed after {} attempts ({}); using {}-char fallback",
                    provider.name(),
                    request.model,
                    options.retries.max(1),
                    e,
                    options.fallback.chars().count()
                );
                options.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use std::time::Duration;

    fn gateway_with_cache(provider: ScriptedProvider) -> (tempfile::TempDir, AiGateway) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(dir.path()).unwrap();
        (dir, AiGateway::new(AnyProvider::new(provider), Some(cache)))
    }

    #[tokio::test]
    async fn returns_completion_on_first_success() {
        let provider = ScriptedProvider::new(vec![Ok("answer".into())]);
        let calls = provider.calls();
        let (_dir, gw) = gateway_with_cache(provider);
        let out = gw.ask(&CompletionRequest::new("q"), &AskOptions::uncached()).await;
        assert_eq!(out, "answer");
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_fallback_after_linear_backoff() {
        let provider = ScriptedProvider::always_failing();
        let calls = provider.calls();
        let (_dir, gw) = gateway_with_cache(provider);

        let options = AskOptions::uncached()
            .with_retries(3, Duration::from_secs(1))
            .with_fallback("(summary unavailable)");
        let start = tokio::time::Instant::now();
        let out = gw.ask(&CompletionRequest::new("q"), &options).await;

        assert_eq!(out, "(summary unavailable)");
        assert_eq!(calls.get(), 3);
        // Sleeps of 1s and 2s between the three attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_completion_is_retried() {
        let provider = ScriptedProvider::new(vec![Ok("".into()), Ok("  \n".into()), Ok("real".into())]);
        let calls = provider.calls();
        let (_dir, gw) = gateway_with_cache(provider);
        let out = gw.ask(&CompletionRequest::new("q"), &AskOptions::uncached()).await;
        assert_eq!(out, "real");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn cache_hit_skips_remote_call() {
        let provider = ScriptedProvider::always_failing();
        let calls = provider.calls();
        let (_dir, gw) = gateway_with_cache(provider);
        let request = CompletionRequest::new("q").with_model("gpt-4o");
        gw.cache.as_ref().unwrap().set("gpt-4o", "q", "cached answer");

        let out = gw.ask(&request, &AskOptions::cached(Duration::from_secs(3600))).await;
        assert_eq!(out, "cached answer");
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn success_is_cached_only_when_enabled() {
        let provider = ScriptedProvider::new(vec![Ok("one".into()), Ok("two".into())]);
        let (_dir, gw) = gateway_with_cache(provider);
        let request = CompletionRequest::new("q");
        let cache = gw.cache.as_ref().unwrap();

        gw.ask(&request, &AskOptions::uncached()).await;
        assert_eq!(cache.get(&request.model, "q", None), None);

        gw.ask(&request, &AskOptions::cached(Duration::from_secs(60))).await;
        assert_eq!(cache.get(&request.model, "q", None).as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn model_is_part_of_the_cache_key() {
        let provider = ScriptedProvider::new(vec![Ok("from mini".into()), Ok("from 4o".into())]);
        let calls = provider.calls();
        let (_dir, gw) = gateway_with_cache(provider);
        let opts = AskOptions::cached(Duration::from_secs(60));

        let a = gw.ask(&CompletionRequest::new("q"), &opts).await;
        let b = gw.ask(&CompletionRequest::new("q").with_model("gpt-4o"), &opts).await;
        assert_eq!((a.as_str(), b.as_str()), ("from mini", "from 4o"));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn works_without_a_cache() {
        let gw = AiGateway::new(AnyProvider::new(ScriptedProvider::new(vec![Ok("x".into())])), None);
        let out = gw.ask(&CompletionRequest::new("q"), &AskOptions::cached(Duration::from_secs(5))).await;
        assert_eq!(out, "x");
    }
}
