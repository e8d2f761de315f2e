//! Phase 1: Discovery
//!
//! Resolves a parsed source URL to a concrete coordinate by probing branch
//! candidates, lists the repository tree for that coordinate and locates the
//! manifest files in scope.
//!
//! Discovery fails fast with [`Error::NoManifestsFound`] when the scope holds
//! no manifest, since an empty graph is not a meaningful result.

use log::info;

use crate::disambiguate::{Disambiguator, Resolution};
use crate::error::{Error, Result};
use crate::locator::locate_manifests;
use crate::provider::HostingApi;
use crate::source::{RepositoryCoordinate, SourceUrl};
use crate::tree::TreeFetcher;

/// Manifests located under a resolved coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub coordinate: RepositoryCoordinate,
    /// Repository-relative manifest paths in listing order.
    pub manifest_paths: Vec<String>,
    pub truncated: bool,
}

/// Split the source's branch-and-path remainder using the provider's
/// branch-existence endpoint.
pub fn resolve(source: &SourceUrl, api: &dyn HostingApi) -> Result<Resolution> {
    Disambiguator::new(source).run(|branch| api.branch_exists(source, branch))
}

/// List the tree of `coordinate` and locate its manifests.
pub fn execute(coordinate: &RepositoryCoordinate, trees: &TreeFetcher) -> Result<Discovery> {
    let listing = trees.fetch(coordinate)?;
    let manifest_paths = locate_manifests(&listing, &coordinate.sub_path);

    if manifest_paths.is_empty() {
        return Err(Error::NoManifestsFound {
            scope: coordinate.to_string(),
        });
    }
    info!("Located {} manifest(s) in {}", manifest_paths.len(), coordinate);

    Ok(Discovery {
        coordinate: coordinate.clone(),
        manifest_paths,
        truncated: listing.truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disambiguate::Confidence;
    use crate::provider::testing::StaticApi;
    use crate::source::parse_source_url;
    use crate::tree::{TreeEntry, TreeListing};
    use std::sync::Arc;

    #[test]
    fn test_resolve_probes_through_api() {
        let api = StaticApi::new().with_branch("release/v2");
        let source = parse_source_url("https://github.com/acme/infra/tree/release/v2/deploy").unwrap();

        let resolution = resolve(&source, &api).unwrap();
        assert_eq!(resolution.confidence, Confidence::Confirmed);
        assert_eq!(resolution.coordinate.branch, "release/v2");
        assert_eq!(resolution.coordinate.sub_path, "deploy");
        assert_eq!(
            *api.probes.lock().unwrap(),
            vec!["release/v2/deploy", "release/v2"]
        );
    }

    #[test]
    fn test_execute_locates_manifests_in_scope() {
        let api = Arc::new(StaticApi::new().with_listing(TreeListing::new(
            vec![
                TreeEntry::blob("kustomization.yaml"),
                TreeEntry::blob("deploy/base/kustomization.yaml"),
                TreeEntry::blob("deploy/overlays/prod/kustomization.yaml"),
            ],
            false,
        )));
        let coordinate = StaticApi::coordinate("main", "deploy");

        let discovery = execute(&coordinate, &TreeFetcher::new(api)).unwrap();
        assert_eq!(
            discovery.manifest_paths,
            vec![
                "deploy/base/kustomization.yaml",
                "deploy/overlays/prod/kustomization.yaml"
            ]
        );
        assert!(!discovery.truncated);
    }

    #[test]
    fn test_execute_fails_fast_without_manifests() {
        let api = Arc::new(StaticApi::new().with_listing(TreeListing::new(
            vec![TreeEntry::blob("README.md")],
            false,
        )));
        let err = execute(&StaticApi::coordinate("main", ""), &TreeFetcher::new(api)).unwrap_err();
        assert!(matches!(err, Error::NoManifestsFound { .. }));
    }
}
