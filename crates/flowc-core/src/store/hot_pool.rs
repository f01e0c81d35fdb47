// Hot-paper pool: landmark papers seeded in bulk, served one per dawn run.
//
// Consumption is two steps (pop_one_unused() then mark_used()) and is not
// atomic. Two processes running the dawn flow at once could both pick the
// same entry; single-invocation deployment is assumed.

use rusqlite::{params, OptionalExtension};

use super::{now_stamp, Store};
use crate::atoms::error::EngineResult;
use crate::atoms::types::{HotPaper, PoolStats};

const COLUMNS: &str = "id, title, summary, year, arxiv, created_at, used";

/// Which slice of the pool a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolFilter {
    All,
    Unused,
    Used,
}

impl PoolFilter {
    fn where_clause(self) -> &'static str {
        match self {
            PoolFilter::All => "",
            PoolFilter::Unused => "WHERE used = 0",
            PoolFilter::Used => "WHERE used = 1",
        }
    }
}

impl HotPaper {
    /// Map a row selected with `COLUMNS`.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(HotPaper {
            id: row.get(0)?,
            title: row.get(1)?,
            summary: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            year: row.get(3)?,
            arxiv: row.get(4)?,
            created_at: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            used: row.get::<_, i64>(6)? != 0,
        })
    }
}

impl Store {
    // ── Seeding ────────────────────────────────────────────────────────

    /// Insert one unused entry. Duplicates (same id, or same title + year)
    /// are ignored; returns whether a row was actually added.
    pub fn add_hot_paper(
        &self,
        id: &str,
        title: &str,
        summary: &str,
        year: Option<i32>,
        arxiv: Option<&str>,
    ) -> EngineResult<bool> {
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO hot_paper_pool (id, title, summary, year, arxiv, created_at, used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
            params![id, title, summary, year, arxiv, now_stamp()],
        )?;
        Ok(inserted > 0)
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// The oldest unused entry, or `None` when the pool is exhausted.
    /// Does not change the entry; call `mark_used` once it is delivered.
    pub fn pop_one_unused(&self) -> EngineResult<Option<HotPaper>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {COLUMNS} FROM hot_paper_pool WHERE used = 0 ORDER BY created_at ASC, rowid ASC LIMIT 1"
        );
        let paper = conn.query_row(&sql, [], HotPaper::from_row).optional()?;
        Ok(paper)
    }

    /// Flag `id` as consumed. Returns false if no unused entry had that id.
    pub fn mark_used(&self, id: &str) -> EngineResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE hot_paper_pool SET used = 1 WHERE id = ?1 AND used = 0",
            params![id],
        )?;
        Ok(changed > 0)
    }

    // ── Inspection ─────────────────────────────────────────────────────

    pub fn get_hot_paper(&self, id: &str) -> EngineResult<Option<HotPaper>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {COLUMNS} FROM hot_paper_pool WHERE id = ?1");
        let paper = conn.query_row(&sql, params![id], HotPaper::from_row).optional()?;
        Ok(paper)
    }

    /// Entries matching `filter`, ordered by id.
    pub fn list_hot_papers(&self, filter: PoolFilter) -> EngineResult<Vec<HotPaper>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {COLUMNS} FROM hot_paper_pool {} ORDER BY id", filter.where_clause());
        let mut stmt = conn.prepare(&sql)?;
        let papers = stmt.query_map([], HotPaper::from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(papers)
    }

    /// Case-insensitive substring match on titles, ordered by id.
    pub fn search_hot_papers(&self, keyword: &str) -> EngineResult<Vec<HotPaper>> {
        let needle = keyword.to_lowercase();
        Ok(self
            .list_hot_papers(PoolFilter::All)?
            .into_iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn hot_pool_stats(&self) -> EngineResult<PoolStats> {
        let conn = self.conn.lock();
        let (total, used): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(used), 0) FROM hot_paper_pool",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(PoolStats { total: total as usize, unused: (total - used) as usize, used: used as usize })
    }

    /// Number of entries still available.
    pub fn hot_pool_remaining(&self) -> EngineResult<usize> {
        Ok(self.hot_pool_stats()?.unused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seeded(n: usize) -> Store {
        let store = Store::open_in_memory().unwrap();
        for i in 0..n {
            store
                .add_hot_paper(&format!("id-{:02}", i), &format!("Paper {}", i), "s", Some(2000 + i as i32), None)
                .unwrap();
        }
        store
    }

    #[test]
    fn duplicate_title_year_is_ignored() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.add_hot_paper("A", "X", "first", Some(2010), None).unwrap());
        assert!(!store.add_hot_paper("B", "X", "second", Some(2010), None).unwrap());
        assert_eq!(store.hot_pool_stats().unwrap().total, 1);
        assert_eq!(store.get_hot_paper("A").unwrap().unwrap().summary, "first");
        assert!(store.get_hot_paper("B").unwrap().is_none());
    }

    #[test]
    fn same_title_different_year_both_kept() {
        let store = Store::open_in_memory().unwrap();
        store.add_hot_paper("A", "X", "", Some(2010), None).unwrap();
        store.add_hot_paper("B", "X", "", Some(2011), None).unwrap();
        assert_eq!(store.hot_pool_stats().unwrap().total, 2);
    }

    #[test]
    fn undated_duplicates_collide() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.add_hot_paper("A", "X", "", None, None).unwrap());
        assert!(!store.add_hot_paper("B", "X", "", None, None).unwrap());
    }

    #[test]
    fn duplicate_id_is_ignored() {
        let store = Store::open_in_memory().unwrap();
        store.add_hot_paper("hep-ex/0001", "X", "", Some(2001), Some("hep-ex/0001")).unwrap();
        assert!(!store.add_hot_paper("hep-ex/0001", "Y", "", Some(2002), None).unwrap());
    }

    #[test]
    fn pop_returns_oldest_and_does_not_consume() {
        let store = seeded(3);
        let first = store.pop_one_unused().unwrap().unwrap();
        assert_eq!(first.id, "id-00");
        assert!(!first.used);
        // Not marked: same entry comes back.
        assert_eq!(store.pop_one_unused().unwrap().unwrap().id, "id-00");
    }

    #[test]
    fn n_cycles_exhaust_n_entries() {
        let n = 5;
        let store = seeded(n);
        let mut seen = HashSet::new();
        for _ in 0..n {
            let p = store.pop_one_unused().unwrap().expect("pool should not be empty yet");
            assert!(seen.insert(p.id.clone()), "entry {} returned twice", p.id);
            assert!(store.mark_used(&p.id).unwrap());
        }
        assert!(store.pop_one_unused().unwrap().is_none());
        assert_eq!(store.hot_pool_stats().unwrap(), PoolStats { total: n, unused: 0, used: n });
    }

    #[test]
    fn mark_used_is_one_way() {
        let store = seeded(1);
        assert!(store.mark_used("id-00").unwrap());
        assert!(!store.mark_used("id-00").unwrap());
        assert!(!store.mark_used("missing").unwrap());
        assert!(store.get_hot_paper("id-00").unwrap().unwrap().used);
    }

    #[test]
    fn listings_and_search() {
        let store = seeded(3);
        store.add_hot_paper("z-top", "Observation of the Top Quark", "", Some(1995), None).unwrap();
        store.mark_used("id-01").unwrap();

        assert_eq!(store.list_hot_papers(PoolFilter::All).unwrap().len(), 4);
        let used: Vec<String> = store.list_hot_papers(PoolFilter::Used).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(used, vec!["id-01"]);
        assert_eq!(store.list_hot_papers(PoolFilter::Unused).unwrap().len(), 3);

        let found = store.search_hot_papers("TOP quark").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "z-top");
        assert!(store.search_hot_papers("higgs").unwrap().is_empty());
        assert_eq!(store.hot_pool_remaining().unwrap(), 3);
    }

    #[test]
    fn undecodable_row_fails_the_listing() {
        let store = seeded(2);
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO hot_paper_pool (id, title, year, created_at) VALUES ('bad', 'Bad row', 'nineteen', 'x')",
                [],
            )
            .unwrap();
        assert!(store.list_hot_papers(PoolFilter::All).is_err());
        assert!(store.search_hot_papers("row").is_err());
    }

    #[test]
    fn empty_pool_stats() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.hot_pool_stats().unwrap(), PoolStats { total: 0, unused: 0, used: 0 });
        assert!(store.pop_one_unused().unwrap().is_none());
    }
}
