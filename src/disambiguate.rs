//! # Branch/Path Disambiguation
//!
//! A tree URL such as `.../tree/feature/login/deploy/app` cannot be split
//! into branch and sub-path syntactically, because branch names may contain
//! `/`. The [`Disambiguator`] resolves it by asking the hosting API whether a
//! candidate branch exists, starting with the longest candidate (all
//! segments) and dropping one trailing segment per attempt.
//!
//! The process is a small state machine:
//!
//! ```text
//! Probing(n) --exists--> Confirmed(coordinate)
//! Probing(n) --absent--> Probing(n - 1)        (n > 1)
//! Probing(1) --absent--> Exhausted(fallback)
//! ```
//!
//! The fallback treats the whole remainder as the branch with an empty
//! sub-path and is reported with [`Confidence::Fallback`]; it is never an
//! error. Probes run strictly one after another, longest first.

use log::{debug, warn};
use serde::Serialize;

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::source::{RepositoryCoordinate, SourceUrl};

/// How the branch of a resolved coordinate was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    /// The hosting API confirmed the branch exists.
    Confirmed,
    /// The URL named no branch; the default branch name was assumed.
    DefaultBranch,
    /// No candidate could be confirmed; the whole remainder is the branch.
    Fallback,
}

/// A resolved coordinate together with the confidence of its branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub coordinate: RepositoryCoordinate,
    pub confidence: Confidence,
}

impl Resolution {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Fallback
    }
}

/// State of a disambiguation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    /// The next probe treats this many leading segments as the branch.
    Probing(usize),
    Confirmed(RepositoryCoordinate),
    Exhausted(RepositoryCoordinate),
}

/// Splits a source's branch-and-path remainder by probing candidates
/// longest-first.
#[derive(Debug, Clone)]
pub struct Disambiguator<'a> {
    source: &'a SourceUrl,
    segments: Vec<&'a str>,
    state: ProbeState,
}

impl<'a> Disambiguator<'a> {
    pub fn new(source: &'a SourceUrl) -> Self {
        let segments: Vec<&str> = source
            .branch_and_path
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let state = if segments.is_empty() {
            ProbeState::Exhausted(RepositoryCoordinate::new(source, DEFAULT_BRANCH, ""))
        } else {
            ProbeState::Probing(segments.len())
        };

        Self {
            source,
            segments,
            state,
        }
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    /// The `(branch, sub_path)` pair the next probe should test, if any.
    pub fn candidate(&self) -> Option<(String, String)> {
        match self.state {
            ProbeState::Probing(len) => Some((
                self.segments[..len].join("/"),
                self.segments[len..].join("/"),
            )),
            _ => None,
        }
    }

    /// Record the outcome of probing the current candidate.
    pub fn advance(&mut self, exists: bool) {
        let ProbeState::Probing(len) = self.state else {
            return;
        };

        self.state = if exists {
            let branch = self.segments[..len].join("/");
            let sub_path = self.segments[len..].join("/");
            ProbeState::Confirmed(RepositoryCoordinate::new(self.source, branch, &sub_path))
        } else if len > 1 {
            ProbeState::Probing(len - 1)
        } else {
            ProbeState::Exhausted(RepositoryCoordinate::new(
                self.source,
                self.segments.join("/"),
                "",
            ))
        };
    }

    /// Drive the state machine to completion using `probe` to test branches.
    ///
    /// A probe error other than an exhausted rate limit counts as "not
    /// confirmed"; a rate limit aborts the run.
    pub fn run<F>(mut self, mut probe: F) -> Result<Resolution>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        if self.source.branch_and_path.is_none() {
            return Ok(Resolution {
                coordinate: RepositoryCoordinate::new(self.source, DEFAULT_BRANCH, ""),
                confidence: Confidence::DefaultBranch,
            });
        }

        while let Some((branch, sub_path)) = self.candidate() {
            debug!("Probing branch {:?} (sub-path {:?})", branch, sub_path);
            let exists = match probe(&branch) {
                Ok(exists) => exists,
                Err(e @ Error::RateLimitExceeded { .. }) => return Err(e),
                Err(e) => {
                    debug!("Probe for branch {:?} failed: {}", branch, e);
                    false
                }
            };
            self.advance(exists);
        }

        match self.state {
            ProbeState::Confirmed(coordinate) => {
                debug!("Confirmed branch {:?}", coordinate.branch);
                Ok(Resolution {
                    coordinate,
                    confidence: Confidence::Confirmed,
                })
            }
            ProbeState::Exhausted(coordinate) => {
                warn!(
                    "Could not confirm any branch for {}; assuming branch {:?} with no sub-path",
                    self.source.original, coordinate.branch
                );
                Ok(Resolution {
                    coordinate,
                    confidence: Confidence::Fallback,
                })
            }
            ProbeState::Probing(_) => unreachable!("probing ends when no candidate remains"),
        }
    }
}
