// FlowC Engine: Local Store
// Seen-paper archive and hot-paper pool in one SQLite file via rusqlite.
//
// Module layout:
//   schema     idempotent table/index creation
//   papers     append-only seen-paper archive (dedup key for the arXiv pipeline)
//   hot_pool   landmark paper pool with a used flag, consumed one per dawn run
//
// Single process, single invocation: the Mutex only serialises access from
// one flow. Nothing here guards against two processes sharing the file.

use crate::atoms::error::EngineResult;
use log::info;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

mod hot_pool;
mod papers;
mod schema;

pub use hot_pool::PoolFilter;

/// Thread-safe database wrapper.
pub struct Store {
    /// The SQLite connection, protected by a Mutex.
    pub conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and initialise tables.
    pub fn open(path: &Path) -> EngineResult<Self> {
        info!("[store] Opening database at {:?}", path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        schema::run_migrations(&conn)?;

        Ok(Store { conn: Mutex::new(conn) })
    }

    /// Fresh in-memory database with the full schema.
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Store { conn: Mutex::new(conn) })
    }
}

/// Current UTC time with microsecond precision, used for `created_at`.
pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
