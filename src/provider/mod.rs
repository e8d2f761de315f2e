//! # Hosting Provider APIs
//!
//! The two supported provider families expose the same three operations
//! behind [`HostingApi`]: a branch-existence probe, a recursive tree listing
//! and raw file retrieval. Every call goes through the shared
//! [`HttpClient`], so both families get the same retry, backoff and
//! rate-limit handling.
//!
//! ## Implementations
//!
//! - [`github::GitHubApi`]: REST v3 API plus `raw.githubusercontent.com`.
//! - [`gitlab::GitLabApi`]: REST v4 API of gitlab.com or a self-hosted
//!   instance.

pub mod github;
pub mod gitlab;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{Credentials, Settings};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpResponse};
use crate::source::{ProviderKind, RepositoryCoordinate, SourceUrl};
use crate::tree::TreeListing;

/// Operations a hosting provider must support - allows mocking in tests
pub trait HostingApi: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether `branch` exists in the repository named by `source`.
    ///
    /// A 404 answer is `Ok(false)`; other failures are errors.
    fn branch_exists(&self, source: &SourceUrl, branch: &str) -> Result<bool>;

    /// Recursive listing of the whole branch (not yet filtered by sub-path).
    fn list_tree(&self, coordinate: &RepositoryCoordinate) -> Result<TreeListing>;

    /// Raw text of the file at repository-relative `path`.
    fn file_content(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<String>;
}

/// Create the API client for a provider family.
pub fn hosting_api(
    kind: ProviderKind,
    settings: &Settings,
    credentials: &Credentials,
    client: HttpClient,
) -> Arc<dyn HostingApi> {
    match kind {
        ProviderKind::GitHub => Arc::new(github::GitHubApi::new(
            client,
            settings.github.clone(),
            credentials.github_token.clone(),
        )),
        ProviderKind::GitLab => Arc::new(gitlab::GitLabApi::new(
            client,
            settings.gitlab.clone(),
            credentials.gitlab_token.clone(),
        )),
    }
}

/// Append `segments` to `base` as individually percent-encoded path
/// segments. A `/` inside a segment is encoded as `%2F`; empty segments are
/// skipped.
pub(crate) fn endpoint<'a, I>(base: &str, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        path.pop_if_empty();
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Decode a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(url: &Url, response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| Error::ProviderResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Interpret the outcome of a branch probe request.
pub(crate) fn probe_outcome(result: Result<HttpResponse>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(Error::ProviderRequest { status: 404, .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
