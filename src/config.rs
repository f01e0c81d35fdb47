// FlowC: Configuration
// Every setting can come from a flag or the environment. Credentials are
// optional here; each collaborator checks its own at construction time and
// reports what is missing as a configuration error.

use clap::Args;
use std::path::PathBuf;

use flowc_core::{AiGateway, AnyProvider, EngineResult, OpenAiProvider, ResponseCache, Store};

use crate::connectors::{GitRepo, NotionClient, SmtpMailer, TelegramClient};
use crate::services::{ArchiveService, HotPaperHistory};

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// Notion database holding one page per day
    #[arg(long, env = "NOTION_DAILY_DB")]
    pub notion_daily_db: Option<String>,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    #[arg(long, env = "SMTP_FROM")]
    pub smtp_from: Option<String>,

    #[arg(long, env = "SMTP_TO")]
    pub smtp_to: Option<String>,

    /// Repository whose commits feed the evening digest
    #[arg(long, env = "GIT_REPO_PATH", default_value = ".")]
    pub git_repo_path: PathBuf,

    /// Working directory for cache, archive and history (default: data dir/flowc)
    #[arg(long, env = "FLOWC_ROOT")]
    pub flowc_root: Option<PathBuf>,

    /// SQLite database (default: <root>/flowc.db)
    #[arg(long, env = "SQLITE_PATH")]
    pub sqlite_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_base_url: None,
            notion_token: None,
            notion_daily_db: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            smtp_to: None,
            git_repo_path: PathBuf::from("."),
            flowc_root: None,
            sqlite_path: None,
        }
    }
}

impl Config {
    // ── Paths ──────────────────────────────────────────────────────────

    pub fn root(&self) -> PathBuf {
        self.flowc_root
            .clone()
            .unwrap_or_else(|| dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("flowc"))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root().join(".flowc_cache")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root().join("archive")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.root().join("logs").join("hotpapers")
    }

    pub fn db_path(&self) -> PathBuf {
        self.sqlite_path.clone().unwrap_or_else(|| self.root().join("flowc.db"))
    }

    // ── Collaborators ──────────────────────────────────────────────────

    pub fn gateway(&self) -> EngineResult<AiGateway> {
        let provider = OpenAiProvider::new(self.openai_api_key.as_deref(), self.openai_base_url.as_deref())?;
        let cache = ResponseCache::open(self.cache_dir())?;
        Ok(AiGateway::new(AnyProvider::new(provider), Some(cache)))
    }

    pub fn store(&self) -> EngineResult<Store> {
        Store::open(&self.db_path())
    }

    pub fn notion(&self) -> EngineResult<NotionClient> {
        NotionClient::new(self.notion_token.as_deref(), self.notion_daily_db.as_deref())
    }

    pub fn telegram(&self) -> EngineResult<TelegramClient> {
        TelegramClient::new(self.telegram_bot_token.as_deref(), self.telegram_chat_id.as_deref())
    }

    pub fn mailer(&self) -> EngineResult<SmtpMailer> {
        SmtpMailer::new(
            self.smtp_host.as_deref(),
            self.smtp_port,
            self.smtp_user.as_deref(),
            self.smtp_password.as_deref(),
            self.smtp_from.as_deref(),
            self.smtp_to.as_deref(),
        )
    }

    pub fn git(&self) -> GitRepo {
        GitRepo::new(self.git_repo_path.clone())
    }

    pub fn archive(&self) -> ArchiveService {
        ArchiveService::new(self.archive_dir())
    }

    pub fn history(&self) -> HotPaperHistory {
        HotPaperHistory::new(self.history_dir())
    }
}
