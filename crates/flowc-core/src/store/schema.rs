// Database schema for the FlowC store.
// Adding a table or column: append an idempotent CREATE … IF NOT EXISTS at
// the end of run_migrations(); never modify existing SQL.

use crate::atoms::error::EngineResult;
use rusqlite::Connection;

pub(crate) fn run_migrations(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS papers (
            id TEXT PRIMARY KEY,
            title TEXT,
            summary TEXT,
            created_at TEXT
        );

        CREATE TABLE IF NOT EXISTS hot_paper_pool (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            summary TEXT,
            year INTEGER,
            arxiv TEXT,
            created_at TEXT,
            used INTEGER NOT NULL DEFAULT 0
        );

        -- COALESCE so two undated entries with the same title still collide;
        -- a plain (title, year) index treats NULLs as distinct.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_hot_paper_title_year
            ON hot_paper_pool(title, COALESCE(year, -1));

        CREATE INDEX IF NOT EXISTS idx_hot_paper_unused
            ON hot_paper_pool(used, created_at);
        ",
    )?;
    Ok(())
}
