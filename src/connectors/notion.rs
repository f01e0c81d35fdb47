// Notion daily-journal client.
// Each request gets three attempts with linear backoff; after that the
// caller sees the fallback (no page, or a failed write) rather than an error.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;

use flowc_core::atoms::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, HTTP_TIMEOUT};
use flowc_core::http::{body_excerpt, build_client, with_linear_retries};
use flowc_core::{EngineError, EngineResult};

use super::Journal;

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// A journal page: its id and raw property map.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalPage {
    pub id: String,
    pub properties: Value,
}

impl JournalPage {
    pub fn from_value(v: &Value) -> Option<Self> {
        let id = v["id"].as_str()?.to_string();
        Some(JournalPage { id, properties: v["properties"].clone() })
    }

    /// Plain text of a rich_text property; empty when absent.
    pub fn text(&self, field: &str) -> String {
        plain_text(&self.properties, field)
    }
}

/// Join the spans of `properties[field].rich_text` with newlines.
pub fn plain_text(properties: &Value, field: &str) -> String {
    let Some(spans) = properties[field]["rich_text"].as_array() else {
        return String::new();
    };
    spans
        .iter()
        .map(|s| s["plain_text"].as_str().or_else(|| s["text"]["content"].as_str()).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
    database_id: String,
    retry_delay: Duration,
}

impl NotionClient {
    pub fn new(token: Option<&str>, database_id: Option<&str>) -> EngineResult<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EngineError::Config("NOTION_TOKEN not set".into()))?;
        let database_id = database_id
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| EngineError::Config("NOTION_DAILY_DB not set".into()))?;
        Ok(NotionClient {
            client: build_client(HTTP_TIMEOUT),
            base_url: NOTION_API.to_string(),
            token: token.trim().to_string(),
            database_id: database_id.trim().to_string(),
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

    async fn request_once(&self, method: Method, url: &str, body: &Value) -> EngineResult<Value> {
        let resp = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::delivery(
                "notion",
                format!("HTTP {}: {}", status.as_u16(), body_excerpt(&text, 200)),
            ));
        }
        Ok(resp.json().await?)
    }

    /// `None` once every attempt has failed.
    async fn request(&self, method: Method, url: &str, body: &Value) -> Option<Value> {
        with_linear_retries("notion", DEFAULT_RETRIES, self.retry_delay, move |_| {
            self.request_once(method.clone(), url, body)
        })
        .await
        .ok()
    }
}

#[async_trait]
impl Journal for NotionClient {
    async fn query_by_date(&self, date: &str) -> Option<JournalPage> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);
        let payload = json!({"filter": {"property": "Date", "date": {"equals": date}}});
        info!("[notion] Querying page for {}", date);

        let res = self.request(Method::POST, &url, &payload).await.unwrap_or_else(|| json!({"results": []}));
        let page = res["results"].get(0).and_then(JournalPage::from_value);
        if page.is_none() {
            info!("[notion] No page dated {}", date);
        }
        page
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> bool {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let ok = self.request(Method::PATCH, &url, &json!({"properties": properties})).await.is_some();
        if !ok {
            warn!("[notion] Update of page {} gave up", page_id);
        }
        ok
    }

    async fn create_page(&self, properties: Value) -> bool {
        let url = format!("{}/pages", self.base_url);
        let payload = json!({"parent": {"database_id": self.database_id}, "properties": properties});
        let ok = self.request(Method::POST, &url, &payload).await.is_some();
        if !ok {
            warn!("[notion] Page creation gave up");
        }
        ok
    }
}
