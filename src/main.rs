use chrono::Local;
use clap::{Parser, Subcommand};
use log::{error, info};

use flowc::flows::{DawnFlow, EveningFlow, MorningFlow};
use flowc::services::JournalService;
use flowc::Config;
use flowc_core::arxiv::{ArxivClient, ArxivPipeline};
use flowc_core::inspire::{InspireBootstrap, InspireClient};
use flowc_core::EngineResult;

/// FlowC: daily Notion, git and arXiv digests.
#[derive(Parser)]
#[command(name = "flowc", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send today's plan to Telegram.
    Morning,

    /// Build and deliver the evening digest.
    Evening,

    /// Carry over yesterday's plan and serve the hot paper of the day.
    Dawn,

    /// Seed the hot-paper pool from INSPIRE-HEP.
    Bootstrap {
        /// Stop once this many unused papers are in the pool.
        #[arg(long)]
        target: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("[flowc] {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> EngineResult<()> {
    let config = cli.config;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Morning => {
            let gateway = config.gateway()?;
            let journal = JournalService::new(Box::new(config.notion()?));
            let telegram = config.telegram()?;
            MorningFlow { gateway: &gateway, journal: &journal, notifier: &telegram }
                .run(today)
                .await;
        }
        Command::Evening => {
            let gateway = config.gateway()?;
            let journal = JournalService::new(Box::new(config.notion()?));
            let telegram = config.telegram()?;
            let mailer = config.mailer()?;
            let git = config.git();
            let store = config.store()?;
            let arxiv = ArxivPipeline::new(Box::new(ArxivClient::default()));
            let archive = config.archive();
            EveningFlow {
                gateway: &gateway,
                journal: &journal,
                notifier: &telegram,
                mailer: &mailer,
                commits: &git,
                arxiv: &arxiv,
                store: &store,
                archive: &archive,
            }
            .run(today)
            .await;
        }
        Command::Dawn => {
            let journal = JournalService::new(Box::new(config.notion()?));
            let telegram = config.telegram()?;
            let store = config.store()?;
            let history = config.history();
            DawnFlow { journal: &journal, notifier: &telegram, store: &store, history: &history }
                .run(today)
                .await;
        }
        Command::Bootstrap { target } => {
            let gateway = config.gateway()?;
            let store = config.store()?;
            let report = InspireBootstrap::new(Box::new(InspireClient::default()))
                .bootstrap_default(&gateway, &store, target)
                .await?;
            info!("[flowc] Pool holds {} unused papers ({} added)", report.unused, report.added);
        }
    }
    Ok(())
}
