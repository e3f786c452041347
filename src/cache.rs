//! Normalized-record caching for large data directories.
//!
//! Re-parsing two dozen multi-megabyte state exports on every run is the
//! slow path; the cache keys normalized records on a content hash so
//! unchanged files skip JSON parsing and field mapping entirely.

use crate::InspectionRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const CACHE_VERSION: u32 = 1;
pub const CACHE_FILENAME: &str = ".facwatch-cache.json";

/// Cache entry for one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// SHA256 of the source file content
    content_hash: String,
    /// Profile the records were normalized with
    profile: String,
    records: Vec<InspectionRecord>,
    /// Raw records dropped for a missing facility key
    dropped: usize,
    cached_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheData {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Cache manager for normalized records
pub struct RecordCache {
    cache_path: PathBuf,
    data: CacheData,
    dirty: bool,
    enabled: bool,
}

impl RecordCache {
    /// Create a cache rooted next to the data directory
    pub fn new(root: &Path) -> Self {
        let cache_path = root.join(CACHE_FILENAME);
        let data = Self::load_cache(&cache_path).unwrap_or_default();
        Self {
            cache_path,
            data,
            dirty: false,
            enabled: true,
        }
    }

    /// Create a disabled cache (every lookup misses, set is a no-op)
    pub fn disabled() -> Self {
        Self {
            cache_path: PathBuf::new(),
            data: CacheData::default(),
            dirty: false,
            enabled: false,
        }
    }

    fn load_cache(path: &Path) -> Option<CacheData> {
        let content = fs::read_to_string(path).ok()?;
        let data: CacheData = serde_json::from_str(&content).ok()?;
        if data.version != CACHE_VERSION {
            return None;
        }
        Some(data)
    }

    /// Look up normalized records for a source file; the hit must match
    /// both the content hash and the profile used to normalize.
    pub fn get(
        &self,
        path: &Path,
        content: &str,
        profile: &str,
    ) -> Option<(Vec<InspectionRecord>, usize)> {
        if !self.enabled {
            return None;
        }
        let entry = self.data.entries.get(&cache_key(path))?;
        if entry.profile != profile || entry.content_hash != content_hash(content) {
            return None;
        }
        Some((entry.records.clone(), entry.dropped))
    }

    /// Store normalized records for a source file
    pub fn set(
        &mut self,
        path: &Path,
        content: &str,
        profile: &str,
        records: &[InspectionRecord],
        dropped: usize,
    ) {
        if !self.enabled {
            return;
        }
        let cached_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.data.entries.insert(
            cache_key(path),
            CacheEntry {
                content_hash: content_hash(content),
                profile: profile.to_string(),
                records: records.to_vec(),
                dropped,
                cached_at,
            },
        );
        self.dirty = true;
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.dirty = true;
    }

    /// Persist to disk if anything changed
    pub fn save(&self) -> Result<()> {
        if !self.enabled || !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string(&self.data).context("Failed to serialize cache")?;
        fs::write(&self.cache_path, json)
            .with_context(|| format!("Failed to write cache: {}", self.cache_path.display()))?;
        Ok(())
    }
}

fn cache_key(path: &Path) -> String {
    path.display().to_string()
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identity;
    use tempfile::TempDir;

    fn record(key: &str) -> InspectionRecord {
        InspectionRecord {
            facility_key: key.into(),
            date_raw: None,
            date: None,
            kind: None,
            identity: Identity {
                name: key.into(),
                ..Default::default()
            },
            deficiencies: vec![],
            details: vec![],
        }
    }

    #[test]
    fn round_trip_hit() {
        let dir = TempDir::new().unwrap();
        let mut cache = RecordCache::new(dir.path());
        let path = dir.path().join("ca_01.json");
        cache.set(&path, "[]", "ca", &[record("1")], 2);

        let (records, dropped) = cache.get(&path, "[]", "ca").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn content_change_misses() {
        let dir = TempDir::new().unwrap();
        let mut cache = RecordCache::new(dir.path());
        let path = dir.path().join("ca_01.json");
        cache.set(&path, "old", "ca", &[record("1")], 0);
        assert!(cache.get(&path, "new", "ca").is_none());
    }

    #[test]
    fn profile_change_misses() {
        let dir = TempDir::new().unwrap();
        let mut cache = RecordCache::new(dir.path());
        let path = dir.path().join("data.json");
        cache.set(&path, "[]", "ca", &[record("1")], 0);
        assert!(cache.get(&path, "[]", "az").is_none());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        {
            let mut cache = RecordCache::new(dir.path());
            cache.set(&path, "[]", "ca", &[record("1")], 0);
            cache.save().unwrap();
        }
        let cache = RecordCache::new(dir.path());
        assert!(cache.get(&path, "[]", "ca").is_some());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let mut cache = RecordCache::disabled();
        let path = Path::new("x.json");
        cache.set(path, "[]", "ca", &[record("1")], 0);
        assert!(cache.get(path, "[]", "ca").is_none());
        cache.save().unwrap();
    }

    #[test]
    fn clear_removes_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = RecordCache::new(dir.path());
        let path = dir.path().join("data.json");
        cache.set(&path, "[]", "ca", &[record("1")], 0);
        cache.clear();
        assert!(cache.get(&path, "[]", "ca").is_none());
    }
}
