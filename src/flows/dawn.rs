// Dawn: carry yesterday's plan into today's TODO, then serve one hot paper.
//
// The hot paper is selected first and flagged used only once it has been
// delivered. Selection and flagging are separate statements, so two
// concurrent dawn runs could pick the same entry; runs are assumed to be
// sequential.

use chrono::NaiveDate;
use log::{error, info, warn};

use flowc_core::Store;

use crate::connectors::Notifier;
use crate::services::journal::CarryOver;
use crate::services::templates::{hot_paper_message, NO_HOT_PAPER};
use crate::services::{HotPaperHistory, JournalService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotPaperOutcome {
    /// Sent and flagged used.
    Delivered(String),
    /// Picked but not delivered; stays unused for the next run.
    NotDelivered(String),
    /// No unused entry left.
    PoolEmpty,
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DawnReport {
    pub carry_over: CarryOver,
    pub hot_paper: HotPaperOutcome,
}

pub struct DawnFlow<'a> {
    pub journal: &'a JournalService,
    pub notifier: &'a dyn Notifier,
    pub store: &'a Store,
    pub history: &'a HotPaperHistory,
}

impl DawnFlow<'_> {
    pub async fn run(&self, today: NaiveDate) -> DawnReport {
        info!("[flow:dawn] Starting for {}", today);
        let carry_over = self.journal.carry_over(today).await;
        let hot_paper = self.hot_paper_of_the_day(today).await;
        info!("[flow:dawn] Done: carry-over {:?}, hot paper {:?}", carry_over, hot_paper);
        DawnReport { carry_over, hot_paper }
    }

    pub async fn hot_paper_of_the_day(&self, today: NaiveDate) -> HotPaperOutcome {
        let paper = match self.store.pop_one_unused() {
            Ok(Some(paper)) => paper,
            Ok(None) => {
                info!("[flow:dawn] Hot-paper pool is exhausted");
                if !self.notifier.send(NO_HOT_PAPER).await {
                    warn!("[flow:dawn] Could not deliver the empty-pool notice");
                }
                return HotPaperOutcome::PoolEmpty;
            }
            Err(e) => {
                error!("[flow:dawn] Hot-paper pool unavailable: {}", e);
                return HotPaperOutcome::StoreUnavailable;
            }
        };

        if !self.notifier.send(&hot_paper_message(&paper)).await {
            warn!("[flow:dawn] Delivery of {} failed; leaving it unused", paper.id);
            return HotPaperOutcome::NotDelivered(paper.id);
        }

        if let Err(e) = self.history.save(today, &paper) {
            warn!("[flow:dawn] Could not record history for {}: {}", paper.id, e);
        }
        match self.store.mark_used(&paper.id) {
            Ok(true) => {}
            Ok(false) => warn!("[flow:dawn] {} was already marked used", paper.id),
            Err(e) => error!("[flow:dawn] Failed to mark {} used: {}", paper.id, e),
        }
        HotPaperOutcome::Delivered(paper.id)
    }
}
