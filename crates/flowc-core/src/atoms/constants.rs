// ── FlowC Atoms: Constants ─────────────────────────────────────────────────
// All named constants for the core crate live here.

use std::time::Duration;

// ── Completion gateway defaults ────────────────────────────────────────────
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 700;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Per-request HTTP timeout for feeds, bibliographic APIs and messaging.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Completions can legitimately take longer than a feed fetch.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

// ── Keyword engine ─────────────────────────────────────────────────────────
pub const BASE_KEYWORDS: &[&str] = &["tau", "lfv", "belle ii", "trigger", "form factor", "tdcpv"];
pub const KEYWORD_SAMPLE_PAPERS: usize = 8;
pub const KEYWORD_SUMMARY_PREFIX_CHARS: usize = 200;
pub const KEYWORD_TTL: Duration = Duration::from_secs(3600);

/// Generic markers that keep a paper even when keyword generation drifts.
pub const DOMAIN_MARKERS: &[&str] = &["phys", "hep"];

// ── arXiv feed ─────────────────────────────────────────────────────────────
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
pub const ARXIV_CATEGORIES: &str = "(cat:hep-ex OR cat:hep-ph)";
pub const ARXIV_MAX_RESULTS: u32 = 30;
pub const ARXIV_PRIMARY_WINDOW_DAYS: i64 = 1;
pub const ARXIV_FALLBACK_WINDOW_DAYS: i64 = 3;
pub const ARXIV_FETCH_ATTEMPTS: u32 = 3;
/// How many fetched papers are shown to the keyword engine.
pub const ARXIV_KEYWORD_SAMPLE: usize = 20;

// ── INSPIRE-HEP ────────────────────────────────────────────────────────────
pub const INSPIRE_API_URL: &str = "https://inspirehep.net/api/literature";
pub const INSPIRE_PAGE_SIZE: u32 = 25;
pub const INSPIRE_SORT: &str = "mostcited";
pub const INSPIRE_FETCH_ATTEMPTS: u32 = 3;
pub const INSPIRE_SUMMARY_MODEL: &str = "gpt-4o";
pub const INSPIRE_SUMMARY_TTL: Duration = Duration::from_secs(86_400);
pub const HOT_POOL_DEFAULT_TARGET: usize = 300;
/// Prefix for identifiers synthesised from title + year.
pub const INSPIRE_ID_PREFIX: &str = "inspire::";
