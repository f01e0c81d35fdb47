// FlowC: Test doubles
// In-memory collaborators for driving the flows without Notion, Telegram,
// SMTP or git. Each fake is Clone and shares its state, so a test keeps one
// handle for assertions and boxes another into the flow.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

use flowc_core::{EngineError, EngineResult};

use crate::connectors::{CommitSource, Journal, JournalPage, Mailer, Notifier, PullOutcome};

// ── Journal ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeJournal {
    pages: Arc<Mutex<Vec<(String, JournalPage)>>>,
    updates: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeJournal {
    /// Add a page dated `date` with plain-text rich_text fields.
    pub fn add_page(&self, id: &str, date: &str, fields: &[(&str, &str)]) {
        let mut properties = json!({});
        for (name, text) in fields {
            properties[*name] = json!({"rich_text": [{"plain_text": text}]});
        }
        self.pages.lock().push((date.to_string(), JournalPage { id: id.to_string(), properties }));
    }

    pub fn page_on(&self, date: &str) -> Option<JournalPage> {
        self.pages.lock().iter().find(|(d, _)| d == date).map(|(_, p)| p.clone())
    }

    /// Plain text of `field` on page `id`, as Notion would report it.
    pub fn field(&self, id: &str, field: &str) -> String {
        self.pages
            .lock()
            .iter()
            .find(|(_, p)| p.id == id)
            .map(|(_, p)| {
                p.properties[field]["rich_text"]
                    .as_array()
                    .map(|spans| {
                        spans
                            .iter()
                            .map(|s| s["plain_text"].as_str().or_else(|| s["text"]["content"].as_str()).unwrap_or(""))
                            .collect::<String>()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Every (page id, properties) patch received.
    pub fn updates(&self) -> Vec<(String, Value)> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl Journal for FakeJournal {
    async fn query_by_date(&self, date: &str) -> Option<JournalPage> {
        self.page_on(date)
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> bool {
        self.updates.lock().push((page_id.to_string(), properties.clone()));
        let mut pages = self.pages.lock();
        let Some((_, page)) = pages.iter_mut().find(|(_, p)| p.id == page_id) else {
            return false;
        };
        if let (Some(target), Some(patch)) = (page.properties.as_object_mut(), properties.as_object()) {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        true
    }

    async fn create_page(&self, properties: Value) -> bool {
        let Some(date) = properties["Date"]["date"]["start"].as_str().map(str::to_string) else {
            return false;
        };
        let mut pages = self.pages.lock();
        let id = format!("created-{}", pages.len());
        pages.push((date, JournalPage { id, properties }));
        true
    }
}

// ── Notifier ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl RecordingNotifier {
    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        RecordingNotifier { failing: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> bool {
        if self.failing {
            return false;
        }
        self.sent.lock().push(text.to_string());
        true
    }
}

// ── Mailer ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer { failing: true, ..Default::default() }
    }

    /// (subject, html) pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_html(&self, subject: &str, html: &str) -> EngineResult<()> {
        if self.failing {
            return Err(EngineError::delivery("email", "SMTP error: connection refused"));
        }
        self.sent.lock().push((subject.to_string(), html.to_string()));
        Ok(())
    }
}

// ── Commits ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeCommits {
    log: String,
    pulls: Arc<Mutex<usize>>,
}

impl FakeCommits {
    pub fn new(log: &str) -> Self {
        FakeCommits { log: log.to_string(), pulls: Arc::default() }
    }

    pub fn pulls(&self) -> usize {
        *self.pulls.lock()
    }
}

#[async_trait]
impl CommitSource for FakeCommits {
    async fn pull(&self) -> PullOutcome {
        *self.pulls.lock() += 1;
        PullOutcome::Failed("no remote configured".into())
    }

    async fn commit_log(&self, _days: u32) -> String {
        self.log.clone()
    }
}
