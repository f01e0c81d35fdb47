// Morning: today's TODO → rewritten plan → Telegram.

use chrono::NaiveDate;
use log::{info, warn};

use flowc_core::AiGateway;

use crate::connectors::Notifier;
use crate::services::journal::FIELD_TODO;
use crate::services::templates::morning_message;
use crate::services::{Channel, DigestTask, JournalService, Summarizer};

pub struct MorningFlow<'a> {
    pub gateway: &'a AiGateway,
    pub journal: &'a JournalService,
    pub notifier: &'a dyn Notifier,
}

impl MorningFlow<'_> {
    /// Returns the message that was (or would have been) sent.
    pub async fn run(&self, today: NaiveDate) -> String {
        info!("[flow:morning] Starting for {}", today);

        let todo = match self.journal.page_for(today).await {
            Some(page) => page.text(FIELD_TODO),
            None => {
                warn!("[flow:morning] No journal page for today; planning from an empty list");
                String::new()
            }
        };

        let plan = Summarizer::new(self.gateway)
            .render_one(DigestTask::DailyTodo, Channel::Telegram, &todo)
            .await;
        let plan = if plan.is_empty() { todo } else { plan };

        let message = morning_message(&plan);
        if !self.notifier.send(&message).await {
            warn!("[flow:morning] Telegram delivery failed");
        }
        info!("[flow:morning] Done");
        message
    }
}
