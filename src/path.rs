//! Path and reference utilities for kustomap
//!
//! Everything here is purely lexical: paths are resolved as strings, never
//! against the host filesystem, so a reference such as `../base` resolves the
//! same way for a local scan and for a remote listing.

use crate::defaults::MANIFEST_FILE_NAMES;

/// Resolve `reference` relative to the directory `base`.
///
/// Segments of `base` and then `reference` are folded left to right: `..`
/// pops the last accumulated segment (and is a no-op at the root), `.` and
/// empty segments are skipped. The result never contains `.` or `..`
/// segments; the root is reported as `"."`.
pub fn resolve_relative(base: &str, reference: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in base.split('/').chain(reference.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            segment => parts.push(segment),
        }
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Lexically normalize a display path: `apps/../base/` becomes `base`, and
/// an empty or fully cancelled path becomes `"."`.
pub fn normalize_display_path(path: &str) -> String {
    resolve_relative(".", path)
}

/// Final segment of a slash-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `name` is exactly one of the recognized manifest file names.
pub fn is_manifest_file_name(name: &str) -> bool {
    MANIFEST_FILE_NAMES.contains(&name)
}

/// Whether a reference names a plain YAML resource file rather than a
/// kustomization directory or manifest.
pub fn is_plain_yaml_file(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    let name = file_name(&lower);
    (name.ends_with(".yaml") || name.ends_with(".yml")) && !is_manifest_file_name(name)
}

/// Whether `path` equals `scope` or is nested under it. An empty scope
/// contains everything.
pub fn is_within_scope(path: &str, scope: &str) -> bool {
    if scope.is_empty() {
        return true;
    }
    path == scope
        || path
            .strip_prefix(scope)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Directory containing a manifest, given the manifest's repository path.
pub fn manifest_dir(manifest_path: &str) -> &str {
    match manifest_path.rfind('/') {
        Some(idx) => &manifest_path[..idx],
        None => "",
    }
}

/// Display path of a manifest directory relative to the scanned sub-path.
///
/// The scope root itself (and the repository root) is shown as `"."`.
pub fn display_path(manifest_path: &str, scope: &str) -> String {
    let dir = manifest_dir(manifest_path);
    let relative = if scope.is_empty() {
        dir
    } else if dir == scope {
        ""
    } else {
        dir.strip_prefix(scope)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(dir)
    };

    if relative.is_empty() {
        ".".to_string()
    } else {
        relative.to_string()
    }
}

/// Whether a reference is a fully-qualified remote URL.
pub fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Normalize a remote URL for comparison.
///
/// Every query parameter is dropped except `ref`, which is kept as the only
/// parameter when present: `https://h/p?ref_type=heads&ref=main` becomes
/// `https://h/p?ref=main`.
pub fn normalize_remote_url(url: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => return url.to_string(),
    };

    let git_ref = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == "ref" && !value.is_empty())
        .map(|(_, value)| value);

    match git_ref {
        Some(value) => format!("{}?ref={}", base, value),
        None => base.to_string(),
    }
}

/// Edge label for a remote reference: its final path segment, query removed.
pub fn remote_label(reference: &str) -> String {
    let last = file_name(reference);
    let last = last.split('?').next().unwrap_or(last);
    if last.is_empty() {
        "remote".to_string()
    } else {
        last.to_string()
    }
}
