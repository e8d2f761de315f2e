//! # kustomap
//!
//! Discovers kustomization manifests in a Git repository hosted on GitHub or
//! GitLab (or in a local directory), parses them, and builds a dependency
//! graph of how overlays, bases and components reference one another. Cycles
//! in that graph are reported without failing the scan.
//!
//! ## Quick Example
//!
//! ```
//! use kustomap::config::{Credentials, Settings};
//! use kustomap::local::LocalManifest;
//! use kustomap::phases::Scanner;
//!
//! let mut scanner = Scanner::new(Settings::default(), Credentials::default()).unwrap();
//! let report = scanner
//!     .scan_entries(
//!         vec![
//!             LocalManifest::new("base", "resources:\n  - deployment.yaml\n"),
//!             LocalManifest::new("overlays/prod", "resources:\n  - ../../base\n"),
//!         ],
//!         "example",
//!     )
//!     .unwrap();
//!
//! assert_eq!(report.graph.node_count(), 2);
//! assert_eq!(report.graph.edges().next().map(|e| e.label.as_str()), Some("../../base"));
//! assert!(!report.has_cycles());
//! ```
//!
//! ## Core Concepts
//!
//! - **Sources (`source`, `disambiguate`)**: Parse a repository URL and split
//!   its ambiguous `<branch>/<path>` remainder by probing the provider.
//! - **Providers (`http`, `provider`)**: Blocking HTTP with retry, backoff and
//!   rate-limit detection, and the GitHub and GitLab REST families on top.
//! - **Discovery (`tree`, `locator`)**: List the repository tree and pick out
//!   the manifest files in scope.
//! - **Content (`cache`, `content`)**: Fetch manifest text through a
//!   single-flight cache.
//! - **Nodes (`manifest`, `node`)**: Decode manifests and classify them as
//!   base, overlay or component.
//! - **Graph (`graph`)**: Resolve references into edges and detect cycles.
//! - **Phases (`phases`)**: The scan pipeline tying it all together.
//!
//! ## Execution Flow
//!
//! [`phases::Scanner`] runs a remote scan as:
//!
//! 1.  **Discovery**: Resolve the URL to a coordinate, list the tree and
//!     locate manifests.
//! 2.  **Parse**: Download manifests in parallel and build one node each.
//! 3.  **Assembly**: Build the graph and detect cycles.
//!
//! Local scans enumerate the directory with [`local::enumerate_manifests`]
//! and start at the parse phase.

pub mod cache;
pub mod config;
pub mod content;
pub mod defaults;
pub mod disambiguate;
pub mod error;
pub mod graph;
pub mod http;
pub mod local;
pub mod locator;
pub mod manifest;
pub mod node;
pub mod output;
pub mod path;
pub mod phases;
pub mod provider;
pub mod source;
pub mod suggestions;
pub mod tree;

#[cfg(test)]
mod path_proptest;
