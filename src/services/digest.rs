// FlowC: Digest Rendering
//
// One logical item (a commit log, a day's journal, a TODO list, a batch of
// papers) rendered into several channel-specific texts. Each (task, channel)
// pair has its own prompt; model and cache lifetime are per task. Channels
// are rendered one after another through the shared gateway.

use log::{info, warn};
use std::collections::BTreeMap;
use std::time::Duration;

use flowc_core::atoms::types::truncate_chars;
use flowc_core::{AiGateway, AskOptions, CompletionRequest, Paper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Notion,
    Email,
    Telegram,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Notion, Channel::Email, Channel::Telegram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Notion => "notion",
            Channel::Email => "email",
            Channel::Telegram => "telegram",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestTask {
    Commits,
    DailyLog,
    DailyTodo,
    Arxiv,
}

impl DigestTask {
    pub fn model(&self) -> &'static str {
        "gpt-4o"
    }

    /// Cache lifetime; `None` means the task is never cached.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            DigestTask::Commits => Some(Duration::from_secs(7_200)),
            DigestTask::DailyLog => Some(Duration::from_secs(80_000)),
            DigestTask::DailyTodo => Some(Duration::from_secs(3_600)),
            DigestTask::Arxiv => None,
        }
    }

    fn options(&self) -> AskOptions {
        match self.ttl() {
            Some(ttl) => AskOptions::cached(ttl),
            None => AskOptions::uncached(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            DigestTask::Commits => "commits",
            DigestTask::DailyLog => "daily-log",
            DigestTask::DailyTodo => "daily-todo",
            DigestTask::Arxiv => "arxiv",
        }
    }
}

fn style(channel: Channel) -> &'static str {
    match channel {
        Channel::Notion => "Write for a personal Notion journal. Markdown is fine: short bullets, **bold** for key points.",
        Channel::Email => "Write for an HTML email body. Plain sentences, no Markdown syntax.",
        Channel::Telegram => {
            "Write for a Telegram message. Very compact, Telegram Markdown only (*bold*, _italic_), no headings."
        }
    }
}

/// Prompt for one (task, channel) pair. `count` is the number of papers for
/// `DigestTask::Arxiv` and ignored otherwise.
pub fn prompt(task: DigestTask, channel: Channel, input: &str, count: usize) -> String {
    let style = style(channel);
    match task {
        DigestTask::Commits => format!(
            "Summarize today's git commits into a short progress note grouped by topic.\n\
             Skip merge noise and typo fixes.\n{style}\n\nCommits:\n{input}\n"
        ),
        DigestTask::DailyLog => format!(
            "Rewrite this daily research log into a clear end-of-day summary: what was done, \
             what is blocked, what comes next.\n{style}\n\nLog:\n{input}\n"
        ),
        DigestTask::DailyTodo => format!(
            "Turn this TODO list into a focused plan for today. Order by priority and keep every item.\n\
             If the list is empty, suggest a light day of reading and cleanup.\n{style}\n\nTODO:\n{input}\n"
        ),
        DigestTask::Arxiv => {
            let shape = match channel {
                Channel::Telegram => {
                    format!("Return exactly {count} lines, one per paper, in order. One short sentence each.")
                }
                _ => format!(
                    "Return exactly {count} paragraphs, one per paper, in order, separated by a blank line. \
                     Two to four sentences each."
                ),
            };
            format!(
                "You are assisting an experimental high-energy physicist (Belle II, tau LFV, flavour physics).\n\
                 Summarize each of the following arXiv papers for a daily digest.\n{shape}\n\
                 Do not repeat the titles or the [n] markers.\n{style}\n\nPapers:\n{input}\n"
            )
        }
    }
}

/// Numbered "[i] title\nsummary" blocks separated by blank lines.
pub fn papers_block(papers: &[Paper]) -> String {
    papers
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[{}] {}\n{}", i + 1, p.title, p.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Map one model answer back onto `n` papers: one line each for Telegram,
/// one paragraph each for Email. Any other shape repeats the whole answer
/// for every paper.
pub fn split_per_paper(out: &str, n: usize, channel: Channel) -> Vec<String> {
    let out = out.trim();

    let lines: Vec<String> = out.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect();
    if channel == Channel::Telegram && lines.len() == n {
        return lines;
    }

    let paragraphs: Vec<String> =
        out.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect();
    if channel == Channel::Email && paragraphs.len() == n {
        return paragraphs;
    }

    vec![out.to_string(); n]
}

pub struct Summarizer<'a> {
    gateway: &'a AiGateway,
}

impl<'a> Summarizer<'a> {
    pub fn new(gateway: &'a AiGateway) -> Self {
        Summarizer { gateway }
    }

    pub async fn render_one(&self, task: DigestTask, channel: Channel, input: &str) -> String {
        let request = CompletionRequest::new(prompt(task, channel, input, 0)).with_model(task.model());
        self.gateway.ask(&request, &task.options()).await.trim().to_string()
    }

    /// Render `input` once per requested channel.
    pub async fn render(&self, task: DigestTask, input: &str, channels: &[Channel]) -> BTreeMap<Channel, String> {
        let mut out = BTreeMap::new();
        for &channel in channels {
            if out.contains_key(&channel) {
                continue;
            }
            info!("[digest] Rendering {} for {}", task.as_str(), channel.as_str());
            out.insert(channel, self.render_one(task, channel, input).await);
        }
        out
    }

    /// One summary per paper, in order. With no model answer at all each
    /// paper falls back to the start of its own abstract.
    pub async fn summarize_papers(&self, papers: &[Paper], channel: Channel) -> Vec<String> {
        if papers.is_empty() {
            return Vec::new();
        }
        let task = DigestTask::Arxiv;
        let request = CompletionRequest::new(prompt(task, channel, &papers_block(papers), papers.len()))
            .with_model(task.model());
        let out = self.gateway.ask(&request, &task.options()).await;

        if out.trim().is_empty() {
            warn!("[digest] No paper summaries from the model; using abstracts");
            return papers.iter().map(|p| truncate_chars(&p.summary, 300).to_string()).collect();
        }
        split_per_paper(&out, papers.len(), channel)
    }
}
