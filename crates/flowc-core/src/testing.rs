// FlowC Engine: Test doubles
// In-process fakes for the network seams, shared by unit tests here and the
// integration tests of the flowc package.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::atoms::error::ProviderError;
use crate::atoms::traits::{CompletionProvider, FeedSource, LiteratureSource};
use crate::atoms::types::CompletionRequest;

/// Shared call counter handed out before a fake is boxed.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Completion provider ────────────────────────────────────────────────────

enum Script {
    Queue(Mutex<VecDeque<Result<String, ProviderError>>>),
    Fail,
    Respond(Box<dyn Fn(&CompletionRequest) -> String + Send + Sync>),
}

/// Completion provider that replays a script. Once a queue runs dry every
/// further call fails with a transport error.
pub struct ScriptedProvider {
    script: Script,
    calls: CallCounter,
    prompts: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(responses.into())))
    }

    pub fn always_failing() -> Self {
        Self::with_script(Script::Fail)
    }

    /// Answer every request with `f(request)`.
    pub fn responding(f: impl Fn(&CompletionRequest) -> String + Send + Sync + 'static) -> Self {
        Self::with_script(Script::Respond(Box::new(f)))
    }

    fn with_script(script: Script) -> Self {
        ScriptedProvider { script, calls: CallCounter::default(), prompts: Arc::default() }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.bump();
        self.prompts.lock().push(request.clone());
        match &self.script {
            Script::Queue(q) => q
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Transport("script exhausted".into()))),
            Script::Fail => Err(ProviderError::Transport("connection refused".into())),
            Script::Respond(f) => Ok(f(request)),
        }
    }
}

// ── Feed source ────────────────────────────────────────────────────────────

/// Feed source returning a fixed payload per window size.
pub struct StaticFeed {
    payloads: Vec<(i64, String)>,
    requested: Arc<Mutex<Vec<i64>>>,
}

impl StaticFeed {
    pub fn new(payloads: Vec<(i64, String)>) -> Self {
        StaticFeed { payloads, requested: Arc::default() }
    }

    /// Windows (in days) requested so far.
    pub fn requested(&self) -> Arc<Mutex<Vec<i64>>> {
        self.requested.clone()
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self, days: i64) -> String {
        self.requested.lock().push(days);
        self.payloads
            .iter()
            .find(|(d, _)| *d == days)
            .map(|(_, p)| p.clone())
            .unwrap_or_default()
    }
}

/// Render a minimal arXiv Atom feed from (id, title, summary) triples.
pub fn atom_feed(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n<title>ArXiv Query</title>\n",
    );
    for (id, title, summary) in entries {
        xml.push_str(&format!(
            "<entry>\n<id>{id}</id>\n<updated>2025-03-04T18:00:00Z</updated>\n<title>{title}</title>\n<summary>{summary}</summary>\n<link href=\"{id}\" rel=\"alternate\" type=\"text/html\"/>\n</entry>\n"
        ));
    }
    xml.push_str("</feed>\n");
    xml
}

// ── Literature source ──────────────────────────────────────────────────────

/// INSPIRE source keyed by (query substring, page).
pub struct StaticLiterature {
    pages: Vec<(String, u32, serde_json::Value)>,
    calls: CallCounter,
}

impl StaticLiterature {
    pub fn new(pages: Vec<(&str, u32, serde_json::Value)>) -> Self {
        StaticLiterature {
            pages: pages.into_iter().map(|(q, p, v)| (q.to_string(), p, v)).collect(),
            calls: CallCounter::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl LiteratureSource for StaticLiterature {
    async fn fetch_page(
        &self,
        query: &str,
        _size: u32,
        page: u32,
        _sort: Option<&str>,
    ) -> Option<serde_json::Value> {
        self.calls.bump();
        self.pages
            .iter()
            .find(|(q, p, _)| query.contains(q.as_str()) && *p == page)
            .map(|(_, _, v)| v.clone())
    }
}
