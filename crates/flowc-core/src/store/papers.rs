use rusqlite::{params, OptionalExtension};

use super::{now_stamp, Store};
use crate::atoms::error::EngineResult;
use crate::atoms::types::SeenPaper;

impl Store {
    // ── Seen-paper archive ─────────────────────────────────────────────

    /// True if `id` has already been accepted into a digest.
    pub fn paper_exists(&self, id: &str) -> EngineResult<bool> {
        let conn = self.conn.lock();
        let found = conn
            .query_row("SELECT 1 FROM papers WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Record a paper as seen. Existing rows are never touched; returns
    /// false when `id` was already present.
    pub fn record_paper(&self, id: &str, title: &str, summary: &str) -> EngineResult<bool> {
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO papers (id, title, summary, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, title, summary, now_stamp()],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_paper(&self, id: &str) -> EngineResult<Option<SeenPaper>> {
        let conn = self.conn.lock();
        let paper = conn
            .query_row(
                "SELECT id, title, summary, created_at FROM papers WHERE id = ?1",
                params![id],
                |row| {
                    Ok(SeenPaper {
                        id: row.get(0)?,
                        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        summary: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        created_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(paper)
    }

    pub fn count_papers(&self) -> EngineResult<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM papers", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_exists() {
        let store = Store::open_in_memory().unwrap();
        assert!(!store.paper_exists("http://arxiv.org/abs/2501.00001v1").unwrap());
        assert!(store.record_paper("http://arxiv.org/abs/2501.00001v1", "T", "S").unwrap());
        assert!(store.paper_exists("http://arxiv.org/abs/2501.00001v1").unwrap());
        assert_eq!(store.count_papers().unwrap(), 1);
    }

    #[test]
    fn records_are_never_overwritten() {
        let store = Store::open_in_memory().unwrap();
        store.record_paper("p1", "first title", "first summary").unwrap();
        assert!(!store.record_paper("p1", "second title", "second summary").unwrap());

        let row = store.get_paper("p1").unwrap().unwrap();
        assert_eq!(row.title, "first title");
        assert_eq!(row.summary, "first summary");
        assert!(!row.created_at.is_empty());
        assert_eq!(store.count_papers().unwrap(), 1);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/flowc.db");
        {
            let store = Store::open(&path).unwrap();
            store.record_paper("p1", "t", "s").unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert!(store.paper_exists("p1").unwrap());
    }
}
