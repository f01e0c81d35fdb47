// FlowC Core: the stateful half of the daily flows.
// Response cache, resilient completion gateway, keyword engine, arXiv
// relevance pipeline, SQLite store (seen papers + hot-paper pool) and the
// INSPIRE seeding routine. Delivery channels and the flows themselves live
// in the `flowc` package.

pub mod atoms;
pub mod cache;
pub mod http;
pub mod providers;
pub mod gateway;
pub mod keywords;
pub mod store;
pub mod arxiv;
pub mod inspire;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use atoms::error::{EngineError, EngineResult, ProviderError};
pub use atoms::traits::{CompletionProvider, FeedSource, LiteratureSource};
pub use atoms::types::{AskOptions, CompletionRequest, HotPaper, Paper, PoolStats, SeenPaper};
pub use cache::ResponseCache;
pub use gateway::AiGateway;
pub use providers::{AnyProvider, OpenAiProvider};
pub use store::{PoolFilter, Store};
