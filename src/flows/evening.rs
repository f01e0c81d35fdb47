// Evening: commits, journal summary and new arXiv papers, rendered for
// Notion, email and Telegram, then archived.
//
// Segments run in order and never fail the flow: a missing commit log,
// journal page or paper list puts a placeholder in that segment only.

use chrono::NaiveDate;
use log::{error, info, warn};

use flowc_core::arxiv::ArxivPipeline;
use flowc_core::{AiGateway, Paper, Store};

use crate::connectors::{CommitSource, Mailer, Notifier, PullOutcome};
use crate::services::journal::{FIELD_SUMMARY, FIELD_TIME_SUMMARY};
use crate::services::templates::{
    commits_for_email, commits_for_telegram, email_report, evening_message, paper_for_email, paper_for_telegram,
    EVENING_SUBJECT, NO_COMMITS, NO_JOURNAL_PAGE, NO_PAPERS,
};
use crate::services::{ArchiveService, Channel, DigestTask, JournalService, Summarizer};

/// One digest section in its per-channel forms.
#[derive(Debug, Default)]
struct Segment {
    telegram: String,
    email: String,
    notion: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EveningReport {
    pub telegram: String,
    pub email_html: String,
    pub papers: Vec<Paper>,
    pub telegram_sent: bool,
    pub email_sent: bool,
}

pub struct EveningFlow<'a> {
    pub gateway: &'a AiGateway,
    pub journal: &'a JournalService,
    pub notifier: &'a dyn Notifier,
    pub mailer: &'a dyn Mailer,
    pub commits: &'a dyn CommitSource,
    pub arxiv: &'a ArxivPipeline,
    pub store: &'a Store,
    pub archive: &'a ArchiveService,
}

impl EveningFlow<'_> {
    pub async fn run(&self, today: NaiveDate) -> EveningReport {
        info!("[flow:evening] Starting for {}", today);
        let summarizer = Summarizer::new(self.gateway);

        let commits = self.commits_segment(&summarizer).await;
        let journal = self.journal_segment(&summarizer, today, commits.notion.as_deref()).await;
        let (arxiv, papers) = self.arxiv_segment(&summarizer).await;

        let email_html = email_report(&journal.email, &commits.email, &arxiv.email);
        let email_sent = match self.mailer.send_html(EVENING_SUBJECT, &email_html).await {
            Ok(()) => true,
            Err(e) => {
                error!("[flow:evening] Email report not sent: {}", e);
                false
            }
        };

        let body = [commits.telegram.as_str(), journal.telegram.as_str(), arxiv.telegram.as_str()]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let (telegram, telegram_sent) = if body.is_empty() {
            (String::new(), false)
        } else {
            let message = evening_message(&body);
            let sent = self.notifier.send(&message).await;
            if !sent {
                warn!("[flow:evening] Telegram digest not delivered");
            }
            (message, sent)
        };

        for (name, text) in [("email.html", email_html.as_str()), ("telegram.txt", telegram.as_str())] {
            if let Err(e) = self.archive.save(today, name, text) {
                warn!("[flow:evening] Could not archive {}: {}", name, e);
            }
        }

        info!("[flow:evening] Done: {} paper(s), email={}, telegram={}", papers.len(), email_sent, telegram_sent);
        EveningReport { telegram, email_html, papers, telegram_sent, email_sent }
    }

    async fn commits_segment(&self, summarizer: &Summarizer<'_>) -> Segment {
        match self.commits.pull().await {
            PullOutcome::Updated => info!("[flow:evening] git pull: up to date"),
            outcome => warn!("[flow:evening] git pull {}; reading local history", outcome),
        }

        let raw = self.commits.commit_log(1).await;
        if raw.trim().is_empty() {
            return Segment { telegram: NO_COMMITS.to_string(), ..Segment::default() };
        }

        let mut rendered = summarizer.render(DigestTask::Commits, &raw, &Channel::ALL).await;
        let mut take = |c: Channel| rendered.remove(&c).unwrap_or_default();
        let notion = take(Channel::Notion);
        let telegram = take(Channel::Telegram);
        let email = take(Channel::Email);
        Segment {
            telegram: commits_for_telegram(&telegram),
            email: commits_for_email(&email),
            notion: Some(notion).filter(|n| !n.is_empty()),
        }
    }

    async fn journal_segment(&self, summarizer: &Summarizer<'_>, today: NaiveDate, git_summary: Option<&str>) -> Segment {
        let Some(page) = self.journal.page_for(today).await else {
            return Segment {
                telegram: NO_JOURNAL_PAGE.to_string(),
                email: NO_JOURNAL_PAGE.to_string(),
                notion: None,
            };
        };

        let daily_log = format!("Summary:\n{}\n\n{}", page.text(FIELD_SUMMARY), page.text(FIELD_TIME_SUMMARY));
        let mut rendered = summarizer.render(DigestTask::DailyLog, &daily_log, &Channel::ALL).await;

        if let Some(git) = git_summary {
            if !self.journal.write_git_summary(&page.id, git).await {
                warn!("[flow:evening] GitSummary not written");
            }
        }
        let notion = rendered.remove(&Channel::Notion).unwrap_or_default();
        if notion.is_empty() {
            warn!("[flow:evening] No journal summary from the model; AISummary left as is");
        } else if !self.journal.write_ai_summary(&page.id, &notion).await {
            warn!("[flow:evening] AISummary not written");
        }

        Segment {
            telegram: rendered.remove(&Channel::Telegram).unwrap_or_default(),
            email: rendered.remove(&Channel::Email).unwrap_or_default(),
            notion: Some(notion),
        }
    }

    async fn arxiv_segment(&self, summarizer: &Summarizer<'_>) -> (Segment, Vec<Paper>) {
        let papers = self.arxiv.run(self.gateway, self.store).await;
        if papers.is_empty() {
            let segment = Segment {
                telegram: NO_PAPERS.to_string(),
                email: format!("<p>{}</p>", NO_PAPERS),
                notion: None,
            };
            return (segment, papers);
        }

        let for_email = summarizer.summarize_papers(&papers, Channel::Email).await;
        let for_telegram = summarizer.summarize_papers(&papers, Channel::Telegram).await;

        let email = papers
            .iter()
            .zip(&for_email)
            .map(|(p, s)| paper_for_email(p, s))
            .collect::<Vec<_>>()
            .join("\n");
        let telegram = papers
            .iter()
            .zip(&for_telegram)
            .map(|(p, s)| paper_for_telegram(p, s))
            .collect::<Vec<_>>()
            .join("\n");

        (Segment { telegram, email, notion: None }, papers)
    }
}
