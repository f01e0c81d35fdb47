// INSPIRE-HEP literature API client.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use crate::atoms::constants::{HTTP_TIMEOUT, INSPIRE_API_URL, INSPIRE_FETCH_ATTEMPTS};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::traits::LiteratureSource;
use crate::http::{body_excerpt, build_client, with_linear_retries};

pub struct InspireClient {
    client: Client,
    base_url: String,
    retry_delay: Duration,
}

impl Default for InspireClient {
    fn default() -> Self {
        Self::new(INSPIRE_API_URL)
    }
}

impl InspireClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        InspireClient {
            client: build_client(HTTP_TIMEOUT),
            base_url: base_url.into(),
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_once(&self, params: &[(&str, String)]) -> EngineResult<serde_json::Value> {
        let resp = self.client.get(&self.base_url).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::upstream(
                "inspire",
                format!("HTTP {}: {}", status.as_u16(), body_excerpt(&body, 200)),
            ));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl LiteratureSource for InspireClient {
    async fn fetch_page(
        &self,
        query: &str,
        size: u32,
        page: u32,
        sort: Option<&str>,
    ) -> Option<serde_json::Value> {
        let mut params = vec![("q", query.to_string()), ("size", size.to_string()), ("page", page.to_string())];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        debug!("[inspire] GET page={} size={} q={}", page, size, query);

        let params = params.as_slice();
        let result = with_linear_retries("inspire", INSPIRE_FETCH_ATTEMPTS, self.retry_delay, move |_| {
            self.fetch_once(params)
        })
        .await;

        match result {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("[inspire] Page {} unavailable: {}", page, e);
                None
            }
        }
    }
}
