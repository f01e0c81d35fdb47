// FlowC: Services
// Digest rendering, journal helpers, and the on-disk archive and hot-paper
// history written by the flows.

pub mod archive;
pub mod digest;
pub mod history;
pub mod journal;
pub mod templates;

pub use archive::ArchiveService;
pub use digest::{Channel, DigestTask, Summarizer};
pub use history::{HotPaperHistory, HotPaperRecord};
pub use journal::JournalService;
