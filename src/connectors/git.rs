// Git commit source.
// `pull` is best effort: its outcome is logged by the caller and never
// gates the log read.

use async_trait::async_trait;
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command;

use super::CommitSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    Updated,
    Failed(String),
}

impl fmt::Display for PullOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullOutcome::Updated => write!(f, "up to date"),
            PullOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GitRepo { path: path.into() }
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.path);
        cmd
    }
}

#[async_trait]
impl CommitSource for GitRepo {
    async fn pull(&self) -> PullOutcome {
        info!("[git] Pulling {:?}", self.path);
        match self.git().args(["pull", "--ff-only"]).output().await {
            Ok(out) if out.status.success() => PullOutcome::Updated,
            Ok(out) => {
                let mut reason = String::from_utf8_lossy(&out.stderr).trim().to_string();
                if reason.is_empty() {
                    reason = String::from_utf8_lossy(&out.stdout).trim().to_string();
                }
                PullOutcome::Failed(reason)
            }
            Err(e) => PullOutcome::Failed(e.to_string()),
        }
    }

    async fn commit_log(&self, days: u32) -> String {
        info!("[git] Reading log for last {} day(s)", days);
        let since = format!("--since={}.days", days);
        let result = self
            .git()
            .args(["log", since.as_str(), "--pretty=format:%h %ad %s", "--date=short"])
            .output()
            .await;
        match result {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
            Ok(out) => {
                warn!("[git] git log failed for {:?}: {}", self.path, String::from_utf8_lossy(&out.stderr).trim());
                String::new()
            }
            Err(e) => {
                warn!("[git] Could not run git: {}", e);
                String::new()
            }
        }
    }
}
