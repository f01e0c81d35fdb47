// Per-day archive of the rendered digests: <base>/YYYY-MM-DD/<file>.

use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use flowc_core::EngineResult;

pub struct ArchiveService {
    base: PathBuf,
}

impl ArchiveService {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        ArchiveService { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn day_dir(&self, day: NaiveDate) -> EngineResult<PathBuf> {
        let dir = self.base.join(day.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `text` to `<day>/<filename>`, replacing any earlier copy.
    pub fn save(&self, day: NaiveDate, filename: &str, text: &str) -> EngineResult<PathBuf> {
        let path = self.day_dir(day)?.join(filename);
        fs::write(&path, text)?;
        info!("[archive] Saved {}", path.display());
        Ok(path)
    }
}
