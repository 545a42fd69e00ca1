use crate::data::{Cache, Candidate};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One cached lookup, stored under the hash of its normalized query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub results: Vec<Candidate>,
}

/// JsonFileCache is an implementation of the Cache trait that keeps every
/// lookup in a single JSON document.
///
/// The file is organized as `{ "<sha256 of query>": { timestamp, query, results } }`.
/// Each read loads the whole file and each write rewrites it; there is no
/// locking, so concurrent runs are last-writer-wins.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    /// Location of the cache document
    path: PathBuf,
    /// Entries at least this old are ignored
    ttl: Duration,
}

impl JsonFileCache {
    /// Creates a new JsonFileCache instance
    ///
    /// # Arguments
    /// * `path` - Location of the JSON document (created on first save)
    /// * `ttl_hours` - How long an entry counts as fresh
    pub fn new(path: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        let hours = i64::try_from(ttl_hours).unwrap_or(i64::MAX);
        Self {
            path: path.into(),
            ttl: Duration::try_hours(hours).unwrap_or(Duration::MAX),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Derives the cache key for a query: hex SHA-256 of the trimmed, lowercased text.
    pub fn cache_key(query: &str) -> String {
        let normalized = query.trim().to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Reads every entry. A missing or unparsable file is an empty cache.
    fn load(&self) -> HashMap<String, CacheEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Ignoring unreadable cache {}: {}", self.path.display(), e);
                HashMap::new()
            }
        }
    }

    fn save(&self, entries: &HashMap<String, CacheEntry>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Looks up `query` as of `now`.
    pub fn get_at(&self, query: &str, now: DateTime<Utc>) -> Option<Vec<Candidate>> {
        let key = Self::cache_key(query);
        let entry = self.load().remove(&key)?;

        if now.signed_duration_since(entry.timestamp) < self.ttl {
            Some(entry.results)
        } else {
            debug!("Cache entry for '{}' from {} has expired", query, entry.timestamp);
            None
        }
    }

    /// Stores `results` for `query` stamped with `now`.
    pub fn set_at(&self, query: &str, results: &[Candidate], now: DateTime<Utc>) {
        let mut entries = self.load();
        entries.insert(
            Self::cache_key(query),
            CacheEntry {
                timestamp: now,
                query: query.to_string(),
                results: results.to_vec(),
            },
        );

        if let Err(e) = self.save(&entries) {
            warn!("Cache save failed for {}: {}", self.path.display(), e);
        }
    }
}

impl Cache for JsonFileCache {
    fn get(&self, query: &str) -> Option<Vec<Candidate>> {
        self.get_at(query, Utc::now())
    }

    fn set(&self, query: &str, results: &[Candidate]) {
        self.set_at(query, results, Utc::now());
    }
}
