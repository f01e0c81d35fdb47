// FlowC Engine: Response Cache
// Content-addressed store for completion outputs: one JSON file per
// (model, prompt) pair, named by the SHA-256 of `model \n prompt`.
//
// Reads fail open: a missing, unreadable or corrupt record is a miss.
// Writes replace the whole record; nothing is ever evicted.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::atoms::error::EngineResult;

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    /// Creation time, fractional seconds since the Unix epoch.
    time: f64,
    out: String,
}

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Open (or create) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ResponseCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the model identifier and prompt text.
    pub fn key(model: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update(b"\n");
        hasher.update(prompt.as_bytes());
        hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn record_path(&self, model: &str, prompt: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(model, prompt)))
    }

    /// Look up a cached output. `ttl = None` ignores age entirely;
    /// otherwise the record must be younger than `ttl`.
    pub fn get(&self, model: &str, prompt: &str, ttl: Option<Duration>) -> Option<String> {
        self.get_at(model, prompt, ttl, Utc::now())
    }

    pub(crate) fn get_at(
        &self,
        model: &str,
        prompt: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let path = self.record_path(model, prompt);
        let raw = fs::read_to_string(&path).ok()?;
        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(r) => r,
            Err(e) => {
                warn!("[cache] Ignoring corrupt record {:?}: {}", path, e);
                return None;
            }
        };

        let Some(ttl) = ttl else {
            return Some(record.out);
        };

        let age = epoch_secs(now) - record.time;
        if age < ttl.as_secs_f64() {
            debug!("[cache] hit model={} age={:.0}s", model, age);
            Some(record.out)
        } else {
            debug!("[cache] stale model={} age={:.0}s ttl={}s", model, age, ttl.as_secs());
            None
        }
    }

    /// Store `output` for (model, prompt), replacing any previous record.
    /// Write failures are logged and swallowed.
    pub fn set(&self, model: &str, prompt: &str, output: &str) {
        self.set_at(model, prompt, output, Utc::now())
    }

    pub(crate) fn set_at(&self, model: &str, prompt: &str, output: &str, now: DateTime<Utc>) {
        let path = self.record_path(model, prompt);
        let record = CacheRecord { time: epoch_secs(now), out: output.to_string() };
        if let Err(e) = write_record(&path, &record) {
            warn!("[cache] Failed to write {:?}: {}", path, e);
        }
    }
}

fn write_record(path: &Path, record: &CacheRecord) -> EngineResult<()> {
    let json = serde_json::to_string(record)?;
    // Write-then-rename so a crash never leaves a half-written record.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn epoch_secs(t: DateTime<Utc>) -> f64 {
    t.timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn cache() -> (tempfile::TempDir, ResponseCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(dir.path().join("cache")).unwrap();
        (dir, cache)
    }

    #[test]
    fn set_then_get_without_ttl() {
        let (_dir, cache) = cache();
        cache.set("gpt-4o", "summarize this", "summary");
        assert_eq!(cache.get("gpt-4o", "summarize this", None).as_deref(), Some("summary"));
    }

    #[test]
    fn miss_for_unknown_pair() {
        let (_dir, cache) = cache();
        cache.set("gpt-4o", "a", "x");
        assert_eq!(cache.get("gpt-4o", "b", None), None);
        assert_eq!(cache.get("gpt-4o-mini", "a", None), None);
    }

    #[test]
    fn key_is_deterministic_and_model_sensitive() {
        assert_eq!(ResponseCache::key("m", "p"), ResponseCache::key("m", "p"));
        assert_ne!(ResponseCache::key("m1", "p"), ResponseCache::key("m2", "p"));
        assert_eq!(ResponseCache::key("m", "p").len(), 64);
    }

    #[test]
    fn ttl_boundary() {
        let (_dir, cache) = cache();
        let written = Utc::now();
        cache.set_at("m", "p", "out", written);

        let ttl = Some(Duration::from_secs(100));
        let young = written + TimeDelta::seconds(99);
        let exact = written + TimeDelta::seconds(100);
        let old = written + TimeDelta::seconds(500);

        assert_eq!(cache.get_at("m", "p", ttl, young).as_deref(), Some("out"));
        assert_eq!(cache.get_at("m", "p", ttl, exact), None);
        assert_eq!(cache.get_at("m", "p", ttl, old), None);
        // No TTL: never expires.
        assert_eq!(cache.get_at("m", "p", None, old).as_deref(), Some("out"));
    }

    #[test]
    fn stale_record_is_overwritten_by_set() {
        let (_dir, cache) = cache();
        let long_ago = Utc::now() - TimeDelta::days(3);
        cache.set_at("m", "p", "old", long_ago);
        assert_eq!(cache.get("m", "p", Some(Duration::from_secs(60))), None);

        cache.set("m", "p", "new");
        assert_eq!(cache.get("m", "p", Some(Duration::from_secs(60))).as_deref(), Some("new"));
    }

    #[test]
    fn corrupt_record_reads_as_miss() {
        let (_dir, cache) = cache();
        let path = cache.record_path("m", "p");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(cache.get("m", "p", None), None);
    }
}
