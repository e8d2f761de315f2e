//! # Source Identifier Parsing
//!
//! Turns a user-supplied repository URL into a [`SourceUrl`]: the hosting
//! provider, host, owner/namespace and project, plus the still-ambiguous
//! `branch_and_path` remainder. Splitting that remainder into a branch and a
//! sub-path requires the hosting API and is done by
//! [`crate::disambiguate`].
//!
//! Two URL shapes are recognized:
//!
//! - GitHub: `https://github.com/<owner>/<repo>/(tree|blob)/<branch_and_path>`
//!   and the short form `https://github.com/<owner>/<repo>`.
//! - GitLab: `https://<host>/<namespace...>/<project>/-/(tree|blob)/<branch_and_path>`,
//!   where the namespace may contain nested groups.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::path;

static GITHUB_TREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/]+)/([^/]+)/(?:tree|blob)/(.+)$")
        .expect("valid GitHub tree pattern")
});

static GITHUB_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/]+)/([^/]+)$")
        .expect("valid GitHub repository pattern")
});

static GITLAB_TREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^/]+)/(.+?)/-/(?:tree|blob)/(.+)$").expect("valid GitLab tree pattern")
});

/// Hosting provider family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    GitLab,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::GitLab => "gitlab",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed source URL whose branch and sub-path are not yet separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    /// The URL as supplied by the user.
    pub original: String,
    pub provider: ProviderKind,
    pub host: String,
    /// Owner or (possibly nested) namespace; empty for a top-level GitLab project.
    pub owner: String,
    pub project: String,
    /// Everything after `tree/` or `blob/`; `None` for a short repository URL.
    pub branch_and_path: Option<String>,
}

impl SourceUrl {
    /// `owner/project`, or just `project` when there is no owner.
    pub fn project_path(&self) -> String {
        project_path(&self.owner, &self.project)
    }
}

/// A fully resolved scan scope on a hosting provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCoordinate {
    pub provider: ProviderKind,
    pub host: String,
    pub owner: String,
    pub project: String,
    pub branch: String,
    /// Empty, or a slash-joined relative path without leading/trailing slash.
    pub sub_path: String,
}

impl RepositoryCoordinate {
    /// Build a coordinate from a parsed source, normalizing `sub_path`.
    pub fn new(source: &SourceUrl, branch: impl Into<String>, sub_path: &str) -> Self {
        Self {
            provider: source.provider,
            host: source.host.clone(),
            owner: source.owner.clone(),
            project: source.project.clone(),
            branch: branch.into(),
            sub_path: normalize_sub_path(sub_path),
        }
    }

    /// `owner/project`, or just `project` when there is no owner.
    pub fn project_path(&self) -> String {
        project_path(&self.owner, &self.project)
    }
}

impl fmt::Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}@{}", self.provider, self.host, self.project_path(), self.branch)?;
        if !self.sub_path.is_empty() {
            write!(f, " ({})", self.sub_path)?;
        }
        Ok(())
    }
}

fn project_path(owner: &str, project: &str) -> String {
    if owner.is_empty() {
        project.to_string()
    } else {
        format!("{}/{}", owner, project)
    }
}

/// Collapse empty segments and drop leading/trailing slashes. A path that
/// points at a manifest file is reduced to the directory containing it.
pub fn normalize_sub_path(sub_path: &str) -> String {
    let segments: Vec<&str> = sub_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    match segments.split_last() {
        Some((last, dir)) if path::is_manifest_file_name(last) => dir.join("/"),
        _ => segments.join("/"),
    }
}

/// Detect the hosting provider family from a URL.
pub fn detect_provider(url: &str) -> Option<ProviderKind> {
    if url.contains("github.com") {
        Some(ProviderKind::GitHub)
    } else if url.contains("gitlab") || url.contains("/-/tree/") || url.contains("/-/blob/") {
        Some(ProviderKind::GitLab)
    } else {
        None
    }
}

/// Parse a repository URL into its provider coordinates.
///
/// Query strings and fragments (GitLab appends `?ref_type=heads` to tree
/// URLs) and a trailing `/` are ignored. Fails with
/// [`Error::InvalidSourceUrl`] when the URL matches neither known shape.
pub fn parse_source_url(raw: &str) -> Result<SourceUrl> {
    let trimmed = raw.trim();
    let invalid = |message: &str, hint: Option<&str>| Error::InvalidSourceUrl {
        url: trimmed.to_string(),
        message: message.to_string(),
        hint: hint.map(str::to_string),
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string(), None))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid("only http(s) URLs are supported", None));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid("URL has no host", None))?;
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let cleaned = format!(
        "{}://{}{}",
        parsed.scheme(),
        authority,
        parsed.path().trim_end_matches('/')
    );

    match detect_provider(&cleaned) {
        Some(ProviderKind::GitHub) => parse_github(trimmed, &cleaned).ok_or_else(|| {
            invalid(
                "not a GitHub repository URL",
                Some("expected https://github.com/<owner>/<repo>/tree/<branch>/<path>"),
            )
        }),
        Some(ProviderKind::GitLab) => parse_gitlab(trimmed, &cleaned).ok_or_else(|| {
            invalid(
                "not a GitLab tree URL",
                Some("expected https://<host>/<namespace>/<project>/-/tree/<branch>/<path>"),
            )
        }),
        None => Err(invalid(
            "unsupported hosting provider",
            Some("only GitHub and GitLab URLs can be scanned remotely"),
        )),
    }
}

fn parse_github(original: &str, cleaned: &str) -> Option<SourceUrl> {
    let source = |owner: &str, project: &str, branch_and_path: Option<String>| SourceUrl {
        original: original.to_string(),
        provider: ProviderKind::GitHub,
        host: "github.com".to_string(),
        owner: owner.to_string(),
        project: project.trim_end_matches(".git").to_string(),
        branch_and_path,
    };

    if let Some(caps) = GITHUB_TREE.captures(cleaned) {
        return Some(source(&caps[1], &caps[2], Some(caps[3].to_string())));
    }
    GITHUB_SHORT
        .captures(cleaned)
        .map(|caps| source(&caps[1], &caps[2], None))
}

fn parse_gitlab(original: &str, cleaned: &str) -> Option<SourceUrl> {
    let caps = GITLAB_TREE.captures(cleaned)?;
    let project_path = caps[2].trim_end_matches(".git");
    let (owner, project) = match project_path.rsplit_once('/') {
        Some((owner, project)) => (owner.to_string(), project.to_string()),
        None => (String::new(), project_path.to_string()),
    };

    Some(SourceUrl {
        original: original.to_string(),
        provider: ProviderKind::GitLab,
        host: caps[1].to_string(),
        owner,
        project,
        branch_and_path: Some(caps[3].to_string()),
    })
}
