//! In-process caching of fetched manifest text

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::error::{Error, Result};
use crate::source::RepositoryCoordinate;

/// Cache key: the full coordinate of one file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub host: String,
    pub owner: String,
    pub project: String,
    pub branch: String,
    pub path: String,
}

impl CacheKey {
    pub fn new(coordinate: &RepositoryCoordinate, path: &str) -> Self {
        Self {
            host: coordinate.host.clone(),
            owner: coordinate.owner.clone(),
            project: coordinate.project.clone(),
            branch: coordinate.branch.clone(),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}:{}",
            self.host, self.owner, self.project, self.branch, self.path
        )
    }
}

type Gate = Arc<Mutex<()>>;

/// Content cache owned by one scanner.
///
/// Entries never expire; [`ContentCache::clear`] is the only eviction.
/// Concurrent requests for the same missing key are serialized on a per-key
/// gate so that only one of them runs the fetch.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    entries: Arc<Mutex<HashMap<CacheKey, String>>>,
    in_flight: Arc<Mutex<HashMap<CacheKey, Gate>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| Error::LockPoisoned {
        context: context.to_string(),
    })
}

impl ContentCache {
    /// Create a new empty content cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached text, or run `fetch` and cache its result.
    ///
    /// A failed fetch caches nothing, so a later call tries again.
    pub fn get_or_fetch<F>(&self, key: &CacheKey, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(hit) = self.get(key)? {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }

        let gate = {
            let mut in_flight = lock(&self.in_flight, "content cache gates")?;
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        let _guard = lock(&gate, "content cache gate")?;

        // Another caller may have filled the entry while we waited.
        if let Some(hit) = self.get(key)? {
            debug!("Cache hit after wait: {}", key);
            return Ok(hit);
        }

        let result = fetch();
        if let Ok(text) = &result {
            self.insert(key.clone(), text.clone())?;
        }
        lock(&self.in_flight, "content cache gates")?.remove(key);
        result
    }

    /// Manually insert a value into the cache
    pub fn insert(&self, key: CacheKey, value: String) -> Result<()> {
        lock(&self.entries, "content cache")?.insert(key, value);
        Ok(())
    }

    /// Get a value from cache without fetching
    pub fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        Ok(lock(&self.entries, "content cache")?.get(key).cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> Result<bool> {
        Ok(lock(&self.entries, "content cache")?.contains_key(key))
    }

    /// Clear all cached entries
    pub fn clear(&self) -> Result<()> {
        lock(&self.entries, "content cache")?.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.entries, "content cache")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(lock(&self.entries, "content cache")?.is_empty())
    }
}
