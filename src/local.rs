//! # Local Manifest Enumeration
//!
//! Walks a directory on disk and returns one [`LocalManifest`] per directory
//! containing a kustomization file, in pre-order with siblings sorted by
//! name. Hidden directories and dependency caches (`node_modules`) are not
//! descended into. When a directory holds both manifest spellings,
//! `kustomization.yaml` wins.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::defaults::{MANIFEST_FILE_NAMES, SKIPPED_DIRECTORIES};
use crate::error::{Error, Result};

/// A manifest found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalManifest {
    /// Directory relative to the scan root, `/`-separated; `"."` for the root.
    pub relative_path: String,
    pub content: String,
}

impl LocalManifest {
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
        }
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&&*name)
}

fn relative_display(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Enumerate every manifest under `root`.
///
/// Fails when `root` is not a readable directory. Unreadable subdirectories
/// and manifest files are skipped with a warning.
pub fn enumerate_manifests(root: &Path) -> Result<Vec<LocalManifest>> {
    if !root.is_dir() {
        return Err(Error::LocalScan {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut manifests = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(Error::Walk(e)),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(manifest_path) = MANIFEST_FILE_NAMES
            .iter()
            .map(|name| entry.path().join(name))
            .find(|candidate| candidate.is_file())
        else {
            continue;
        };

        match fs::read_to_string(&manifest_path) {
            Ok(content) => {
                let relative_path = relative_display(root, entry.path());
                debug!("Found manifest in {}", relative_path);
                manifests.push(LocalManifest {
                    relative_path,
                    content,
                });
            }
            Err(e) => warn!("Skipping {}: {}", manifest_path.display(), e),
        }
    }

    Ok(manifests)
}
