//! Manifest locator: picks kustomization files out of a repository listing.

use crate::path;
use crate::tree::TreeListing;

/// Paths of every blob in `listing` whose file name is exactly a manifest
/// name and which lies at or under `scope` (empty for the whole listing).
///
/// Results keep the listing's order.
pub fn locate_manifests(listing: &TreeListing, scope: &str) -> Vec<String> {
    listing
        .entries
        .iter()
        .filter(|entry| entry.is_blob())
        .filter(|entry| path::is_manifest_file_name(path::file_name(&entry.path)))
        .filter(|entry| path::is_within_scope(&entry.path, scope))
        .map(|entry| entry.path.clone())
        .collect()
}
