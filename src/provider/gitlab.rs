//! GitLab REST API client.
//!
//! Projects are addressed by their URL-encoded `namespace/project` path.
//! The recursive tree listing is paginated; pages are followed through the
//! `X-Next-Page` header up to the configured page limit.

use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use super::{decode, endpoint, probe_outcome, HostingApi};
use crate::config::GitLabSettings;
use crate::error::Result;
use crate::http::{HttpClient, HttpResponse};
use crate::source::{ProviderKind, RepositoryCoordinate, SourceUrl};
use crate::tree::{EntryKind, TreeEntry, TreeListing};

#[derive(Debug, Deserialize)]
struct WireEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct GitLabApi {
    client: HttpClient,
    settings: GitLabSettings,
    token: Option<String>,
}

impl GitLabApi {
    pub fn new(client: HttpClient, settings: GitLabSettings, token: Option<String>) -> Self {
        Self {
            client,
            settings,
            token,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.token
            .iter()
            .map(|token| ("PRIVATE-TOKEN".to_string(), token.clone()))
            .collect()
    }

    fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.client
            .get(ProviderKind::GitLab.as_str(), url.as_str(), &self.headers())
    }

    /// `https://<host><api_path>/projects/<id>/repository/<tail...>`
    fn repository_url(&self, host: &str, project_path: &str, tail: &[&str]) -> Result<Url> {
        let base = format!("https://{}", host);
        let mut segments: Vec<&str> = self.settings.api_path.split('/').collect();
        segments.extend_from_slice(&["projects", project_path, "repository"]);
        segments.extend_from_slice(tail);
        endpoint(&base, segments)
    }
}

impl HostingApi for GitLabApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn branch_exists(&self, source: &SourceUrl, branch: &str) -> Result<bool> {
        let url = self.repository_url(&source.host, &source.project_path(), &["branches", branch])?;
        probe_outcome(self.get(&url))
    }

    fn list_tree(&self, coordinate: &RepositoryCoordinate) -> Result<TreeListing> {
        let project_path = coordinate.project_path();
        let mut entries = Vec::new();
        let mut truncated = false;
        let max_pages = self.settings.max_pages.max(1);
        let mut page: u32 = 1;
        let mut fetched: u32 = 0;

        loop {
            let mut url = self.repository_url(&coordinate.host, &project_path, &["tree"])?;
            url.query_pairs_mut()
                .append_pair("ref", &coordinate.branch)
                .append_pair("recursive", "true")
                .append_pair("per_page", &self.settings.per_page.to_string())
                .append_pair("page", &page.to_string());

            let response = self.get(&url)?;
            fetched += 1;
            let batch: Vec<WireEntry> = decode(&url, &response)?;
            debug!("Tree page {} returned {} entries", page, batch.len());
            entries.extend(batch.into_iter().map(|entry| TreeEntry {
                kind: EntryKind::from_wire(&entry.kind),
                path: entry.path,
            }));

            let next = response
                .header("x-next-page")
                .and_then(|value| value.trim().parse::<u32>().ok());
            match next {
                None => break,
                Some(next) if next <= page => {
                    warn!("Tree page {} points back to page {}; listing stopped", page, next);
                    truncated = true;
                    break;
                }
                Some(_) if fetched >= max_pages => {
                    truncated = true;
                    break;
                }
                Some(next) => page = next,
            }
        }

        Ok(TreeListing::new(entries, truncated))
    }

    fn file_content(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<String> {
        let mut url = self.repository_url(
            &coordinate.host,
            &coordinate.project_path(),
            &["files", path, "raw"],
        )?;
        url.query_pairs_mut().append_pair("ref", &coordinate.branch);
        Ok(self.get(&url)?.body)
    }
}
