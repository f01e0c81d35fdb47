// Channel wrappers and placeholders for the rendered digests.

use flowc_core::{HotPaper, Paper};

pub const NO_COMMITS: &str = "No commits today.";
pub const NO_JOURNAL_PAGE: &str = "No notion page today.";
pub const NO_PAPERS: &str = "No interesting new papers today.";
pub const NO_HOT_PAPER: &str = "No hot paper today.";

pub const EVENING_SUBJECT: &str = "[FlowC] Evening Report";

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn commits_for_telegram(summary: &str) -> String {
    format!("*Commits*\n{}", summary)
}

pub fn commits_for_email(summary: &str) -> String {
    format!("<h2>Git Commits</h2><pre>{}</pre>", escape_html(summary))
}

pub fn paper_for_email(paper: &Paper, summary: &str) -> String {
    format!(
        "<b>{}</b><br>{}<br><a href='{}'>[link]</a><br><br>",
        escape_html(&paper.title),
        escape_html(summary),
        paper.link
    )
}

pub fn paper_for_telegram(paper: &Paper, summary: &str) -> String {
    format!("{}\n{}", paper.title, summary)
}

pub fn morning_message(plan: &str) -> String {
    format!("*Morning Plan*\n\n{}", plan)
}

pub fn evening_message(summary: &str) -> String {
    format!("*Evening Summary*\n\n{}", summary)
}

pub fn hot_paper_message(paper: &HotPaper) -> String {
    let mut msg = format!("*Hot Paper of the Day*\n\n*{}*", paper.title);
    if let Some(year) = paper.year {
        msg.push_str(&format!(" ({})", year));
    }
    if !paper.summary.is_empty() {
        msg.push_str(&format!("\n\n{}", paper.summary));
    }
    if let Some(arxiv) = &paper.arxiv {
        msg.push_str(&format!("\n\nhttps://arxiv.org/abs/{}", arxiv));
    }
    msg
}

/// Evening report mail. `summary` is plain text, the other two sections
/// are already HTML.
pub fn email_report(summary: &str, commits_html: &str, arxiv_html: &str) -> String {
    let summary = escape_html(summary).replace('\n', "<br/>");
    let arxiv = arxiv_html.replace('\n', "<br/>");
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>FlowC Evening Report</title></head>
<body style="font-family: -apple-system, Helvetica, Arial, sans-serif; line-height: 1.5;">
<h1>Evening Report</h1>
<h2>Daily Summary</h2>
<p>{summary}</p>
{commits_html}
<h2>arXiv</h2>
<div>{arxiv}</div>
</body>
</html>
"#
    )
}
