// Journal helpers on top of any `Journal` backend: field reads, Markdown
// writes, and the dawn carry-over of yesterday's plan.

use chrono::{Duration as TimeDelta, NaiveDate};
use log::{info, warn};
use serde_json::{json, Value};

use crate::connectors::{markdown_to_rich_text, Journal, JournalPage};

pub const FIELD_TODO: &str = "TODO";
pub const FIELD_SUMMARY: &str = "Summary";
pub const FIELD_TIME_SUMMARY: &str = "TimeSummary";
pub const FIELD_AI_SUMMARY: &str = "AISummary";
pub const FIELD_GIT_SUMMARY: &str = "GitSummary";
pub const FIELD_TOMORROW: &str = "Tomorrow";

/// What the dawn carry-over did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryOver {
    NoYesterdayPage,
    NothingPlanned,
    UpdatedToday,
    CreatedToday,
    WriteFailed,
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn plain_rich_text(text: &str) -> Value {
    json!({"rich_text": [{"text": {"content": text}}]})
}

pub struct JournalService {
    journal: Box<dyn Journal>,
}

impl JournalService {
    pub fn new(journal: Box<dyn Journal>) -> Self {
        JournalService { journal }
    }

    pub async fn page_for(&self, date: NaiveDate) -> Option<JournalPage> {
        self.journal.query_by_date(&day(date)).await
    }

    /// Write `text` into a rich_text property, Markdown-styled.
    pub async fn write_field(&self, page_id: &str, field: &str, text: &str) -> bool {
        let properties = json!({ field: {"rich_text": markdown_to_rich_text(text)} });
        self.journal.update_page(page_id, properties).await
    }

    pub async fn write_ai_summary(&self, page_id: &str, summary: &str) -> bool {
        self.write_field(page_id, FIELD_AI_SUMMARY, summary).await
    }

    pub async fn write_git_summary(&self, page_id: &str, summary: &str) -> bool {
        self.write_field(page_id, FIELD_GIT_SUMMARY, summary).await
    }

    /// Yesterday's "Tomorrow" becomes today's "TODO". Today's page is
    /// created when it doesn't exist yet.
    pub async fn carry_over(&self, today: NaiveDate) -> CarryOver {
        let yesterday = today - TimeDelta::days(1);

        let Some(y_page) = self.page_for(yesterday).await else {
            warn!("[journal] No page for {}; skipping carry-over", day(yesterday));
            return CarryOver::NoYesterdayPage;
        };
        let carry = y_page.text(FIELD_TOMORROW);
        if carry.is_empty() {
            info!("[journal] Nothing planned for today in yesterday's page");
            return CarryOver::NothingPlanned;
        }

        if let Some(t_page) = self.page_for(today).await {
            let ok = self
                .journal
                .update_page(&t_page.id, json!({ FIELD_TODO: plain_rich_text(&carry) }))
                .await;
            info!("[journal] Carried {} chars into today's TODO", carry.chars().count());
            return if ok { CarryOver::UpdatedToday } else { CarryOver::WriteFailed };
        }

        let today_str = day(today);
        let properties = json!({
            "Name": {"title": [{"text": {"content": format!("Daily Log {}", today_str)}}]},
            "Date": {"date": {"start": today_str}},
            FIELD_TODO: plain_rich_text(&carry),
            FIELD_SUMMARY: {"rich_text": []},
            FIELD_GIT_SUMMARY: {"rich_text": []},
            FIELD_AI_SUMMARY: {"rich_text": []},
            FIELD_TOMORROW: {"rich_text": []},
        });
        if self.journal.create_page(properties).await {
            info!("[journal] Created today's page with carried TODO items");
            CarryOver::CreatedToday
        } else {
            CarryOver::WriteFailed
        }
    }
}
