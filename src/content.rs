//! # Content Fetcher
//!
//! Retrieves the raw text of files within a resolved coordinate. Every
//! lookup goes through the [`ContentCache`] first, so a hit never reaches the
//! network (and never enters the retry loop).

use std::sync::Arc;

use crate::cache::{CacheKey, ContentCache};
use crate::error::Result;
use crate::provider::HostingApi;
use crate::source::RepositoryCoordinate;

#[derive(Clone)]
pub struct ContentFetcher {
    api: Arc<dyn HostingApi>,
    cache: ContentCache,
}

impl ContentFetcher {
    pub fn new(api: Arc<dyn HostingApi>, cache: ContentCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Raw text of `path` (repository-relative) at `coordinate`.
    pub fn fetch(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<String> {
        let key = CacheKey::new(coordinate, path);
        self.cache
            .get_or_fetch(&key, || self.api.file_content(coordinate, path))
    }
}
