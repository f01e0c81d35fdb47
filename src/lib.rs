// FlowC: daily research automation.
// Journal (Notion), git history and arXiv, digested through the completion
// gateway and delivered to Telegram, email and back into the journal.

pub mod config;
pub mod connectors;
pub mod flows;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::Config;
