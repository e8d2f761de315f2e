//! # Tree Fetcher
//!
//! Retrieves the recursive file listing of a resolved coordinate through a
//! [`HostingApi`] and narrows it to the coordinate's sub-path.
//!
//! A listing the provider reports as truncated is still returned, flagged
//! with [`TreeListing::truncated`], so the scan can go on and surface a
//! "possibly incomplete" warning.

use std::sync::Arc;

use log::{info, warn};

use crate::error::Result;
use crate::path;
use crate::provider::HostingApi;
use crate::source::RepositoryCoordinate;

/// Kind of an entry in a repository listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule commits and anything else a provider may report.
    Other,
}

impl EntryKind {
    /// Map a provider's `type` field.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "blob" => EntryKind::Blob,
            "tree" => EntryKind::Tree,
            _ => EntryKind::Other,
        }
    }
}

/// One path in a repository listing, relative to the repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// A recursive listing in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    pub entries: Vec<TreeEntry>,
    /// The provider did not return every entry.
    pub truncated: bool,
}

impl TreeListing {
    pub fn new(entries: Vec<TreeEntry>, truncated: bool) -> Self {
        Self { entries, truncated }
    }

    /// Keep only entries equal to `scope` or nested under it. An empty
    /// scope keeps everything.
    pub fn scoped(self, scope: &str) -> Self {
        if scope.is_empty() {
            return self;
        }
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|entry| path::is_within_scope(&entry.path, scope))
                .collect(),
            truncated: self.truncated,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lists repository trees through a hosting API.
#[derive(Clone)]
pub struct TreeFetcher {
    api: Arc<dyn HostingApi>,
}

impl TreeFetcher {
    pub fn new(api: Arc<dyn HostingApi>) -> Self {
        Self { api }
    }

    /// Fetch the listing for `coordinate`, filtered to its sub-path.
    pub fn fetch(&self, coordinate: &RepositoryCoordinate) -> Result<TreeListing> {
        let listing = self.api.list_tree(coordinate)?;
        if listing.truncated {
            warn!(
                "Listing for {} is truncated; some manifests may be missing",
                coordinate
            );
        }

        let total = listing.len();
        let scoped = listing.scoped(&coordinate.sub_path);
        info!(
            "Listed {} entries for {} ({} in scope)",
            total,
            coordinate,
            scoped.len()
        );
        Ok(scoped)
    }
}
