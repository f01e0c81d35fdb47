// arXiv export API client.
// GET export.arxiv.org/api/query for hep-ex + hep-ph over a trailing window,
// newest submissions first. Three attempts with linear backoff; after that an
// empty payload, which the parser turns into an empty paper list.

use async_trait::async_trait;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;

use crate::atoms::constants::{
    ARXIV_API_URL, ARXIV_CATEGORIES, ARXIV_FETCH_ATTEMPTS, ARXIV_MAX_RESULTS, HTTP_TIMEOUT,
};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::traits::FeedSource;
use crate::http::{build_client, with_linear_retries};

pub struct ArxivClient {
    client: Client,
    base_url: String,
    max_results: u32,
    retry_delay: Duration,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new(ARXIV_API_URL)
    }
}

impl ArxivClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ArxivClient {
            client: build_client(HTTP_TIMEOUT),
            base_url: base_url.into(),
            max_results: ARXIV_MAX_RESULTS,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// `search_query` for submissions between `now - days` and `now`.
    pub fn search_query(now: DateTime<Utc>, days: i64) -> String {
        let start = now - TimeDelta::days(days);
        format!(
            "{} AND submittedDate:[{} TO {}]",
            ARXIV_CATEGORIES,
            start.format("%Y%m%d0000"),
            now.format("%Y%m%d2359"),
        )
    }

    async fn fetch_once(&self, query: &str) -> EngineResult<String> {
        let max_results = self.max_results.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::upstream("arxiv", format!("HTTP {}", status.as_u16())));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl FeedSource for ArxivClient {
    async fn fetch(&self, days: i64) -> String {
        let query = Self::search_query(Utc::now(), days);
        info!("[arxiv] Fetching feed window={}d", days);
        let query = query.as_str();
        match with_linear_retries("arxiv", ARXIV_FETCH_ATTEMPTS, self.retry_delay, move |_| {
            self.fetch_once(query)
        })
        .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("[arxiv] Feed unavailable, continuing with no papers: {}", e);
                String::new()
            }
        }
    }
}
