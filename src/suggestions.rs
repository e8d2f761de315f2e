//! # Error Suggestions
//!
//! Helpers that turn library errors into CLI errors carrying hints, so a
//! failed command says what went wrong and how to fix it.
//!
//! ```rust,ignore
//! use kustomap::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Not a directory: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::path_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// The URL was neither a GitHub nor a GitLab tree/blob URL.
pub fn invalid_source(url: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unrecognized source: {url}\n\n\
         hint: GitHub sources look like https://github.com/<owner>/<repo>/tree/<branch>/<path>\n\
         hint: GitLab sources look like https://gitlab.com/<group>/<project>/-/tree/<branch>/<path>\n\
         hint: A local directory can be scanned by passing its path"
    )
}

/// The provider refused further requests.
pub fn rate_limited(provider: &str, reset_at: Option<u64>) -> anyhow::Error {
    let reset = reset_at
        .map(|t| format!(" (resets at unix time {})", t))
        .unwrap_or_default();
    let token_hint = match provider {
        "gitlab" => "hint: Pass --gitlab-token or set GITLAB_TOKEN for a higher quota",
        _ => "hint: Pass --github-token or set GITHUB_TOKEN for a higher quota",
    };

    anyhow::anyhow!(
        "Rate limit exceeded for {provider}{reset}\n\n\
         {token_hint}\n\
         hint: Wait for the quota to reset and run the scan again"
    )
}

/// Nothing to scan.
pub fn no_manifests(scope: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No kustomization manifest found in {scope}\n\n\
         hint: Only files named kustomization.yaml or kustomization.yml are scanned\n\
         hint: Check that the branch and path in the URL point at the right directory"
    )
}

/// The local source does not exist or is not a directory.
pub fn path_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Directory not found: {path}\n\n\
         hint: Pass a directory containing kustomization files\n\
         hint: Remote sources must start with https://",
        path = path.display()
    )
}

/// Convert a library error into a CLI error, attaching hints where the
/// failure has a known remedy.
pub fn explain(error: Error) -> anyhow::Error {
    match error {
        Error::InvalidSourceUrl { url, .. } => invalid_source(&url),
        Error::RateLimitExceeded { provider, reset_at } => rate_limited(&provider, reset_at),
        Error::NoManifestsFound { scope } => no_manifests(&scope),
        Error::LocalScan { path, .. } => path_not_found(Path::new(&path)),
        other => other.into(),
    }
}
