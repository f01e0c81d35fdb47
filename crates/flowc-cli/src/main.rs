// flowc-pool: read-only inspection of the hot-paper pool.

use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;

use flowc_core::{EngineResult, HotPaper, PoolFilter, Store};

#[derive(Parser)]
#[command(name = "flowc-pool", version, about = "Inspect the FlowC hot-paper pool")]
struct Cli {
    /// SQLite database (default: <FLOWC_ROOT>/flowc.db)
    #[arg(long, env = "SQLITE_PATH")]
    db: Option<PathBuf>,

    /// FlowC working directory (default: data dir/flowc)
    #[arg(long, env = "FLOWC_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every paper.
    List,
    /// List papers not yet served.
    Unused,
    /// List papers already served.
    Used,
    /// Show one paper in full.
    Show { id: String },
    /// Case-insensitive title search.
    Search { keyword: String },
    /// Pool counts.
    Stats,
}

impl Cli {
    fn db_path(&self) -> PathBuf {
        if let Some(db) = &self.db {
            return db.clone();
        }
        self.root
            .clone()
            .unwrap_or_else(|| dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("flowc"))
            .join("flowc.db")
    }
}

fn line(p: &HotPaper) -> String {
    let flag = if p.used { "USED" } else { "unused" };
    let year = p.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
    format!("[{}] {} | {} ({})", flag, p.id, p.title, year)
}

fn print_list(papers: &[HotPaper]) {
    for p in papers {
        println!("{}", line(p));
    }
}

fn run(cli: &Cli) -> EngineResult<()> {
    let store = Store::open(&cli.db_path())?;

    match &cli.command {
        Command::List => print_list(&store.list_hot_papers(PoolFilter::All)?),
        Command::Unused => print_list(&store.list_hot_papers(PoolFilter::Unused)?),
        Command::Used => print_list(&store.list_hot_papers(PoolFilter::Used)?),
        Command::Show { id } => match store.get_hot_paper(id)? {
            None => println!("No paper with id={}", id),
            Some(p) => {
                let rule = "-".repeat(51);
                println!("{rule}");
                println!("Title : {}", p.title);
                println!("Year  : {}", p.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()));
                println!("arXiv : {}", p.arxiv.as_deref().unwrap_or("-"));
                println!("Used  : {}", p.used);
                println!("{rule}");
                println!("Summary:");
                println!("{}", p.summary);
                println!("{rule}");
            }
        },
        Command::Search { keyword } => {
            let found = store.search_hot_papers(keyword)?;
            if found.is_empty() {
                println!("No papers found containing '{}'.", keyword);
            } else {
                print_list(&found);
            }
        }
        Command::Stats => {
            let stats = store.hot_pool_stats()?;
            println!("------ Hot Paper Pool Stats ------");
            println!("Total papers : {}", stats.total);
            println!("Unused       : {}", stats.unused);
            println!("Used         : {}", stats.used);
            println!("----------------------------------");
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("[pool] {}", e);
        std::process::exit(1);
    }
}
