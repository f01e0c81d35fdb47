// FlowC: External Collaborators
// Thin clients for Notion, Telegram, SMTP and git, each behind a trait so
// the flows can be driven by in-process fakes.
//
// Failure policy: nothing here aborts a flow. Reads degrade to empty values,
// sends report a success flag, and only construction can fail (missing
// credentials).

pub mod email;
pub mod git;
pub mod markdown;
pub mod notion;
pub mod telegram;

pub use email::SmtpMailer;
pub use git::{GitRepo, PullOutcome};
pub use markdown::markdown_to_rich_text;
pub use notion::{JournalPage, NotionClient};
pub use telegram::{split_message, TelegramClient};

use async_trait::async_trait;
use flowc_core::EngineResult;
use serde_json::Value;

/// The daily journal: one page per calendar date.
#[async_trait]
pub trait Journal: Send + Sync {
    /// The page whose Date property equals `date` (YYYY-MM-DD), if any.
    async fn query_by_date(&self, date: &str) -> Option<JournalPage>;

    /// Patch `properties` onto an existing page. Returns success.
    async fn update_page(&self, page_id: &str, properties: Value) -> bool;

    /// Create a page in the journal database. Returns success.
    async fn create_page(&self, properties: Value) -> bool;
}

/// A chat destination for digests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text`, split as the channel requires. Returns success.
    async fn send(&self, text: &str) -> bool;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, subject: &str, html: &str) -> EngineResult<()>;
}

/// Commit history of the tracked repository.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Best-effort refresh before reading the log.
    async fn pull(&self) -> PullOutcome;

    /// One line per commit over the last `days` days; empty on failure.
    async fn commit_log(&self, days: u32) -> String;
}
