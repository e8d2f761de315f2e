//! Phase 2: Parse
//!
//! Downloads manifest text (remote scans) on a bounded worker pool and turns
//! each text into a [`ManifestNode`].
//!
//! Downloads run concurrently, but results are collected in discovery order
//! and node ids are assigned sequentially afterwards, so the node sequence
//! never depends on download timing. A failed download or parse only drops
//! that file; an exhausted rate limit aborts the scan.

use log::{info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;

use super::discovery::Discovery;
use super::ScanWarning;
use crate::content::ContentFetcher;
use crate::error::{Error, Result};
use crate::local::LocalManifest;
use crate::node::{ManifestNode, NodeBuilder};
use crate::path;

/// Manifest text, or the reason it could not be obtained, at a display path
#[derive(Debug)]
pub struct ManifestText {
    pub display_path: String,
    pub text: Result<String>,
}

/// Download every discovered manifest.
///
/// Fails only when the provider's rate limit is exhausted.
pub fn fetch_all(
    discovery: &Discovery,
    contents: &ContentFetcher,
    pool: &ThreadPool,
) -> Result<Vec<ManifestText>> {
    let coordinate = &discovery.coordinate;
    let fetched: Vec<(&String, Result<String>)> = pool.install(|| {
        discovery
            .manifest_paths
            .par_iter()
            .map(|repo_path| (repo_path, contents.fetch(coordinate, repo_path)))
            .collect()
    });

    let mut texts = Vec::with_capacity(fetched.len());
    for (repo_path, text) in fetched {
        if let Err(e @ Error::RateLimitExceeded { .. }) = text {
            return Err(e);
        }
        texts.push(ManifestText {
            display_path: path::display_path(repo_path, &coordinate.sub_path),
            text,
        });
    }
    Ok(texts)
}

/// Wrap locally enumerated manifests.
pub fn from_local(entries: Vec<LocalManifest>) -> Vec<ManifestText> {
    entries
        .into_iter()
        .map(|entry| ManifestText {
            display_path: path::normalize_display_path(&entry.relative_path),
            text: Ok(entry.content),
        })
        .collect()
}

/// Build nodes from manifest texts, in order.
pub fn execute(
    texts: Vec<ManifestText>,
    nodes: &NodeBuilder,
    remote_source_url: Option<&str>,
) -> (Vec<ManifestNode>, Vec<ScanWarning>) {
    let mut built = Vec::with_capacity(texts.len());
    let mut warnings = Vec::new();

    for ManifestText { display_path, text } in texts {
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not fetch {}: {}", display_path, e);
                warnings.push(ScanWarning::FetchFailed {
                    path: display_path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match nodes.build(&text, &display_path, remote_source_url) {
            Ok(node) => built.push(node),
            Err(Error::InvalidManifest { path, message }) => {
                warn!("Skipping invalid manifest {}: {}", path, message);
                warnings.push(ScanWarning::InvalidManifest { path, message });
            }
            Err(e) => {
                warn!("Skipping invalid manifest {}: {}", display_path, e);
                warnings.push(ScanWarning::InvalidManifest {
                    path: display_path,
                    message: e.to_string(),
                });
            }
        }
    }

    info!("Built {} node(s)", built.len());
    (built, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ContentCache;
    use crate::provider::testing::StaticApi;
    use std::sync::Arc;

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    fn discovery(paths: &[&str], sub_path: &str) -> Discovery {
        Discovery {
            coordinate: StaticApi::coordinate("main", sub_path),
            manifest_paths: paths.iter().map(|p| p.to_string()).collect(),
            truncated: false,
        }
    }

    #[test]
    fn test_fetch_all_keeps_discovery_order() {
        let mut api = StaticApi::new();
        let paths: Vec<String> = (0..20)
            .map(|i| format!("deploy/app{:02}/kustomization.yaml", i))
            .collect();
        for p in &paths {
            api = api.with_file(p, "kind: Kustomization");
        }
        let contents = ContentFetcher::new(Arc::new(api), ContentCache::new());
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

        let texts = fetch_all(&discovery(&refs, "deploy"), &contents, &pool()).unwrap();
        let displayed: Vec<String> = texts.iter().map(|t| t.display_path.clone()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("app{:02}", i)).collect();
        assert_eq!(displayed, expected);
    }

    #[test]
    fn test_fetch_failures_become_warnings() {
        let api = StaticApi::new().with_file("base/kustomization.yaml", "resources: []");
        let contents = ContentFetcher::new(Arc::new(api), ContentCache::new());
        let texts = fetch_all(
            &discovery(&["base/kustomization.yaml", "gone/kustomization.yaml"], ""),
            &contents,
            &pool(),
        )
        .unwrap();

        let (nodes, warnings) = execute(texts, &NodeBuilder::new(), Some("https://github.com/acme/infra"));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].path, "base");
        assert!(nodes[0].is_remote);
        assert!(matches!(&warnings[..], [ScanWarning::FetchFailed { path, .. }] if path == "gone"));
    }

    #[test]
    fn test_invalid_manifest_is_skipped() {
        let texts = from_local(vec![
            LocalManifest::new("base", "resources: []"),
            LocalManifest::new("broken", "just a string"),
            LocalManifest::new("./overlay/", "resources: [../base]"),
        ]);
        let (nodes, warnings) = execute(texts, &NodeBuilder::new(), None);

        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["base", "overlay"]);
        assert!(matches!(
            &warnings[..],
            [ScanWarning::InvalidManifest { path, .. }] if path == "broken"
        ));
    }

    #[test]
    fn test_local_paths_are_lexically_normalized() {
        let texts = from_local(vec![
            LocalManifest::new("apps/../base", "resources: []"),
            LocalManifest::new("", "kind: Kustomization"),
        ]);
        let paths: Vec<&str> = texts.iter().map(|t| t.display_path.as_str()).collect();
        assert_eq!(paths, vec!["base", "."]);
    }
}
