//! Sync cache: the last server timestamp reconciled for each page and group.
//!
//! The cache is only an optimization for conflict detection. A missing or
//! unreadable cache file loads as an empty cache instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{PageType, SpaGroup, Timestamp};

/// Name of the cache file inside the working directory.
pub const CACHE_FILE: &str = ".cache";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncCache {
    #[serde(default)]
    pages: BTreeMap<String, CacheEntry>,
    #[serde(default)]
    groups: BTreeMap<String, CacheEntry>,
}

impl SyncCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache file path for a working directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE)
    }

    /// Loads the cache, falling back to an empty one if the file is missing
    /// or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Writes the cache as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(CacheError::Serialize)?;
        fs::write(path, json).map_err(|e| CacheError::Io(path.to_path_buf(), e))
    }

    fn page_cache_key(page_type: &PageType, key: &str) -> String {
        format!("{}:{}", page_type, key)
    }

    pub fn page_timestamp(&self, page_type: &PageType, key: &str) -> Option<&Timestamp> {
        self.pages
            .get(&Self::page_cache_key(page_type, key))
            .and_then(|entry| entry.updated_at.as_ref())
    }

    pub fn set_page_timestamp(&mut self, page_type: &PageType, key: &str, updated_at: Timestamp) {
        self.pages.insert(
            Self::page_cache_key(page_type, key),
            CacheEntry {
                updated_at: Some(updated_at),
            },
        );
    }

    pub fn group_timestamp(&self, group: SpaGroup) -> Option<&Timestamp> {
        self.groups
            .get(group.id())
            .and_then(|entry| entry.updated_at.as_ref())
    }

    pub fn set_group_timestamp(&mut self, group: SpaGroup, updated_at: Timestamp) {
        self.groups.insert(
            group.id().to_string(),
            CacheEntry {
                updated_at: Some(updated_at),
            },
        );
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Errors that can occur while persisting the cache.
#[derive(Debug)]
pub enum CacheError {
    Io(PathBuf, io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Io(path, e) => {
                write!(f, "Failed to write cache {}: {}", path.display(), e)
            }
            CacheError::Serialize(e) => write!(f, "Failed to serialize cache: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(_, e) => Some(e),
            CacheError::Serialize(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let cache = SyncCache::load(&SyncCache::path_in(temp.path()));
        assert_eq!(cache, SyncCache::default());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = SyncCache::path_in(temp.path());
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SyncCache::load(&path), SyncCache::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = SyncCache::path_in(temp.path());

        let mut cache = SyncCache::new();
        cache.set_page_timestamp(&PageType::Template, "home_page", "2024-01-01T00:00:00Z".into());
        cache.set_group_timestamp(SpaGroup::GeneralPages, "2024-02-01T00:00:00Z".into());
        cache.save(&path).unwrap();

        let loaded = SyncCache::load(&path);
        assert_eq!(loaded, cache);
        assert_eq!(
            loaded.page_timestamp(&PageType::Template, "home_page"),
            Some(&Timestamp::from("2024-01-01T00:00:00Z"))
        );
        assert_eq!(
            loaded.group_timestamp(SpaGroup::GeneralPages),
            Some(&Timestamp::from("2024-02-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_file_format() {
        let mut cache = SyncCache::new();
        cache.set_page_timestamp(&PageType::Section, "hero", "5".into());
        let json: serde_json::Value = serde_json::to_value(&cache).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pages": { "section:hero": { "updated_at": "5" } },
                "groups": {}
            })
        );
    }

    #[test]
    fn test_legacy_file_without_groups() {
        let temp = TempDir::new().unwrap();
        let path = SyncCache::path_in(temp.path());
        fs::write(
            &path,
            r#"{"pages":{"layout:main":{"updated_at":"2024-01-01"}, "layout:old":{}}}"#,
        )
        .unwrap();

        let cache = SyncCache::load(&path);
        assert_eq!(
            cache.page_timestamp(&PageType::Layout, "main"),
            Some(&Timestamp::from("2024-01-01"))
        );
        assert_eq!(cache.page_timestamp(&PageType::Layout, "old"), None);
        assert_eq!(cache.group_timestamp(SpaGroup::StudentDashboard), None);
    }

    #[test]
    fn test_set_overwrites_entry() {
        let mut cache = SyncCache::new();
        cache.set_page_timestamp(&PageType::Template, "a", "1".into());
        cache.set_page_timestamp(&PageType::Template, "a", "2".into());
        assert_eq!(cache.page_count(), 1);
        assert_eq!(
            cache.page_timestamp(&PageType::Template, "a"),
            Some(&Timestamp::from("2"))
        );
    }
}
