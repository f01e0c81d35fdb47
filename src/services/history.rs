// Hot-paper history: one JSON record per delivered paper,
// <dir>/YYYY-MM-DD.json.

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use flowc_core::{EngineResult, HotPaper};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPaperRecord {
    pub date: String,
    pub id: String,
    pub title: String,
    pub summary: String,
    pub year: Option<i32>,
    pub arxiv: Option<String>,
}

pub struct HotPaperHistory {
    dir: PathBuf,
}

impl HotPaperHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HotPaperHistory { dir: dir.into() }
    }

    fn path(&self, day: &str) -> PathBuf {
        self.dir.join(format!("{}.json", day))
    }

    pub fn save(&self, day: NaiveDate, paper: &HotPaper) -> EngineResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let record = HotPaperRecord {
            date: day.format("%Y-%m-%d").to_string(),
            id: paper.id.clone(),
            title: paper.title.clone(),
            summary: paper.summary.clone(),
            year: paper.year,
            arxiv: paper.arxiv.clone(),
        };
        let path = self.path(&record.date);
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        info!("[history] Recorded hot paper {} at {}", record.id, path.display());
        Ok(path)
    }

    /// Dates with a record, oldest first.
    pub fn list(&self) -> EngineResult<Vec<String>> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Ok(Vec::new());
        };
        let mut days = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().to_string();
            if let Some(day) = name.strip_suffix(".json") {
                days.push(day.to_string());
            }
        }
        days.sort();
        Ok(days)
    }

    pub fn load(&self, day: &str) -> EngineResult<Option<HotPaperRecord>> {
        let path = self.path(day);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
    }
}
