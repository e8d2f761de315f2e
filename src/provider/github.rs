//! GitHub REST API client.
//!
//! Listing is two-step: the branch head is resolved to a commit SHA through
//! `git/ref/heads/<branch>`, then the recursive tree of that commit is
//! fetched. File contents come from the raw content host.

use log::debug;
use serde::Deserialize;

use super::{decode, endpoint, probe_outcome, HostingApi};
use crate::config::GitHubSettings;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::source::{ProviderKind, RepositoryCoordinate, SourceUrl};
use crate::tree::{EntryKind, TreeEntry, TreeListing};

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<WireEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct GitHubApi {
    client: HttpClient,
    settings: GitHubSettings,
    token: Option<String>,
}

impl GitHubApi {
    pub fn new(client: HttpClient, settings: GitHubSettings, token: Option<String>) -> Self {
        Self {
            client,
            settings,
            token,
        }
    }

    fn headers(&self, accept: &str) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), accept.to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers
    }

    fn get(&self, url: &url::Url, accept: &str) -> Result<crate::http::HttpResponse> {
        self.client
            .get(ProviderKind::GitHub.as_str(), url.as_str(), &self.headers(accept))
    }
}

const JSON: &str = "application/vnd.github+json";

impl HostingApi for GitHubApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn branch_exists(&self, source: &SourceUrl, branch: &str) -> Result<bool> {
        let url = endpoint(
            &self.settings.api_url,
            ["repos", source.owner.as_str(), source.project.as_str(), "branches", branch],
        )?;
        probe_outcome(self.get(&url, JSON))
    }

    fn list_tree(&self, coordinate: &RepositoryCoordinate) -> Result<TreeListing> {
        let ref_url = endpoint(
            &self.settings.api_url,
            ["repos", coordinate.owner.as_str(), coordinate.project.as_str(), "git", "ref", "heads"]
                .into_iter()
                .chain(coordinate.branch.split('/')),
        )?;
        let head: RefResponse = decode(&ref_url, &self.get(&ref_url, JSON)?)?;
        if head.object.sha.is_empty() {
            return Err(Error::ProviderResponse {
                url: ref_url.to_string(),
                message: format!("no commit SHA for branch {}", coordinate.branch),
            });
        }
        debug!("Branch {} is at {}", coordinate.branch, head.object.sha);

        let mut tree_url = endpoint(
            &self.settings.api_url,
            [
                "repos",
                coordinate.owner.as_str(),
                coordinate.project.as_str(),
                "git",
                "trees",
                head.object.sha.as_str(),
            ],
        )?;
        tree_url.query_pairs_mut().append_pair("recursive", "1");

        let tree: TreeResponse = decode(&tree_url, &self.get(&tree_url, JSON)?)?;
        let entries = tree
            .tree
            .into_iter()
            .map(|entry| TreeEntry {
                kind: EntryKind::from_wire(&entry.kind),
                path: entry.path,
            })
            .collect();
        Ok(TreeListing::new(entries, tree.truncated))
    }

    fn file_content(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<String> {
        let url = endpoint(
            &self.settings.raw_url,
            [coordinate.owner.as_str(), coordinate.project.as_str()]
                .into_iter()
                .chain(coordinate.branch.split('/'))
                .chain(path.split('/')),
        )?;
        Ok(self.get(&url, "text/plain")?.body)
    }
}
