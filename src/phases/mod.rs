//! Implementation of the three phases of a kustomap scan.
//!
//! ## Overview
//!
//! A scan runs these phases in order:
//! 1. Discovery - resolve the source URL to a coordinate, list the tree and
//!    locate manifest paths (remote sources only)
//! 2. Parse - fetch manifest text in parallel and build one node per file
//! 3. Assembly - resolve references into edges and detect cycles
//!
//! Local sources skip discovery: the directory walk in [`crate::local`]
//! supplies manifest text directly to the parse phase.
//!
//! Failures scoped to one file are recorded as [`ScanWarning`]s and the scan
//! continues. Failures affecting the whole scan abort it; no partial report
//! is ever returned.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::disambiguate::Resolution;
use crate::graph::{DependencyGraph, GraphWarning};

pub mod assembly;
pub mod discovery;
pub mod orchestrator;
pub mod parse;

pub use orchestrator::Scanner;

/// A non-fatal condition recorded during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// No branch candidate could be confirmed; the whole remainder was used.
    LowConfidenceBranch { url: String, branch: String },
    /// The provider returned an incomplete listing.
    TruncatedListing { coordinate: String },
    /// One manifest could not be downloaded.
    FetchFailed { path: String, message: String },
    /// One manifest could not be parsed.
    InvalidManifest { path: String, message: String },
    /// A reference or integrity problem found while building the graph.
    Graph(GraphWarning),
    /// A dependency cycle, as node display paths.
    Cycle { paths: Vec<String> },
}

impl ScanWarning {
    /// Short machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            ScanWarning::LowConfidenceBranch { .. } => "low-confidence-branch",
            ScanWarning::TruncatedListing { .. } => "truncated-listing",
            ScanWarning::FetchFailed { .. } => "fetch-failed",
            ScanWarning::InvalidManifest { .. } => "invalid-manifest",
            ScanWarning::Graph(GraphWarning::UnresolvedLocal { .. }) => "unresolved-local",
            ScanWarning::Graph(GraphWarning::UnresolvedRemote { .. }) => "unresolved-remote",
            ScanWarning::Graph(GraphWarning::DanglingEdge { .. }) => "graph-integrity",
            ScanWarning::Cycle { .. } => "cycle",
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::LowConfidenceBranch { url, branch } => write!(
                f,
                "could not confirm the branch of {}; assumed {:?} with no sub-path",
                url, branch
            ),
            ScanWarning::TruncatedListing { coordinate } => write!(
                f,
                "the file listing of {} was truncated; results may be incomplete",
                coordinate
            ),
            ScanWarning::FetchFailed { path, message } => {
                write!(f, "could not fetch {}: {}", path, message)
            }
            ScanWarning::InvalidManifest { path, message } => {
                write!(f, "skipped invalid manifest {}: {}", path, message)
            }
            ScanWarning::Graph(warning) => warning.fmt(f),
            ScanWarning::Cycle { paths } => {
                write!(f, "dependency cycle: {}", paths.join(" -> "))
            }
        }
    }
}

impl Serialize for ScanWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanWarning", 2)?;
        state.serialize_field("category", self.category())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// The outcome of a completed scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub graph: DependencyGraph,
    /// Cycles as node ids in traversal order.
    pub cycles: Vec<Vec<String>>,
    pub warnings: Vec<ScanWarning>,
    /// How the source URL was resolved; `None` for local scans.
    pub resolution: Option<Resolution>,
}

impl ScanReport {
    /// Cycles with node ids replaced by display paths.
    pub fn cycle_paths(&self) -> Vec<Vec<String>> {
        cycle_paths(&self.graph, &self.cycles)
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

pub(crate) fn cycle_paths(graph: &DependencyGraph, cycles: &[Vec<String>]) -> Vec<Vec<String>> {
    cycles
        .iter()
        .map(|cycle| {
            cycle
                .iter()
                .map(|id| graph.node(id).map_or_else(|| id.clone(), |n| n.path.clone()))
                .collect()
        })
        .collect()
}
