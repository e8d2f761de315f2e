//! # Node Builder
//!
//! Packages a parsed manifest as a [`ManifestNode`]: a unique id, the display
//! path, a kind classified from that path and the parsed document.
//!
//! ## Classification
//!
//! The kind is a heuristic over the lower-cased display path, evaluated as an
//! ordered table of rules where the first matching rule wins and anything
//! unmatched is a base. It is not declared by the manifest itself, so
//! unconventional layouts can be misclassified (a directory named
//! `product-catalog` contains `prod` and is reported as an overlay). That is
//! a known limitation of the heuristic.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::error::Result;
use crate::manifest::{parse_manifest, Kustomization};

/// Role of a manifest in a layered configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Base,
    Overlay,
    Component,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Base => "base",
            NodeKind::Overlay => "overlay",
            NodeKind::Component => "component",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single path test used by a classification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    Contains(&'static str),
    Equals(&'static str),
    EndsWith(&'static str),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Contains(needle) => path.contains(needle),
            PathPattern::Equals(exact) => path == *exact,
            PathPattern::EndsWith(suffix) => path.ends_with(suffix),
        }
    }
}

/// A kind assigned when any of its patterns matches
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub patterns: &'static [PathPattern],
    pub kind: NodeKind,
}

/// Ordered classification table; first match wins.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        patterns: &[
            PathPattern::Contains("/base"),
            PathPattern::Equals("base"),
            PathPattern::EndsWith("/bases"),
        ],
        kind: NodeKind::Base,
    },
    ClassificationRule {
        patterns: &[
            PathPattern::Contains("/overlay"),
            PathPattern::Contains("/overlays"),
            PathPattern::Contains("/env"),
            PathPattern::Contains("/envs"),
            PathPattern::Contains("prod"),
            PathPattern::Contains("dev"),
            PathPattern::Contains("staging"),
        ],
        kind: NodeKind::Overlay,
    },
    ClassificationRule {
        patterns: &[
            PathPattern::Contains("/component"),
            PathPattern::Contains("/components"),
        ],
        kind: NodeKind::Component,
    },
];

/// Classify a display path with [`CLASSIFICATION_RULES`].
pub fn classify(path: &str) -> NodeKind {
    classify_with(CLASSIFICATION_RULES, path)
}

/// Classify `path` against an arbitrary rule table, defaulting to base.
pub fn classify_with(rules: &[ClassificationRule], path: &str) -> NodeKind {
    let lower = path.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| p.matches(&lower)))
        .map(|rule| rule.kind)
        .unwrap_or(NodeKind::Base)
}

/// One discovered manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestNode {
    pub id: String,
    /// Display path relative to the scanned root, `"."` for the root itself.
    pub path: String,
    pub kind: NodeKind,
    pub document: Kustomization,
    pub is_remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_source_url: Option<String>,
}

/// Assigns monotonically increasing node ids.
///
/// Ids are never reused for the lifetime of the builder.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    counter: AtomicUsize,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        format!("node-{}", self.counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Parse `text` and package it as a node at `display_path`.
    pub fn build(
        &self,
        text: &str,
        display_path: &str,
        remote_source_url: Option<&str>,
    ) -> Result<ManifestNode> {
        let document = parse_manifest(text, display_path)?;
        Ok(self.package(document, display_path, remote_source_url))
    }

    /// Package an already parsed document.
    pub fn package(
        &self,
        document: Kustomization,
        display_path: &str,
        remote_source_url: Option<&str>,
    ) -> ManifestNode {
        ManifestNode {
            id: self.next_id(),
            path: display_path.to_string(),
            kind: classify(display_path),
            document,
            is_remote: remote_source_url.is_some(),
            remote_source_url: remote_source_url.map(str::to_string),
        }
    }
}
