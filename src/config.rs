//! # Settings and Credentials
//!
//! This module defines the optional settings file that tunes how kustomap
//! talks to hosting providers, and the credentials supplied for each provider
//! family.
//!
//! ## Key Components
//!
//! - **`Settings`**: API endpoints, HTTP timeouts, the retry policy and scan
//!   parallelism. Every field has a default, so an empty document (or no file
//!   at all) is a valid configuration.
//!
//! - **`Credentials`**: Optional bearer tokens. A missing token is never an
//!   error; requests are then made unauthenticated with a lower quota.
//!
//! ## Lookup
//!
//! `load` reads an explicit path when one is given (a missing explicit file
//! is an error), otherwise the platform default location when it exists,
//! otherwise the built-in defaults.
//!
//! ```
//! use kustomap::config;
//!
//! let settings = config::parse("retry:\n  max_attempts: 5\n").unwrap();
//! assert_eq!(settings.retry.max_attempts, 5);
//! assert_eq!(settings.github.api_url, "https://api.github.com");
//! ```

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{default_config_path, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Error, Result};

/// GitHub endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Base URL serving raw file contents.
    pub raw_url: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
        }
    }
}

/// GitLab endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabSettings {
    /// API path appended to the instance host.
    pub api_path: String,
    /// Page size requested for tree listings.
    pub per_page: u32,
    /// Maximum number of tree pages followed before the listing is
    /// reported as truncated.
    pub max_pages: u32,
}

impl Default for GitLabSettings {
    fn default() -> Self {
        Self {
            api_path: "/api/v4".to_string(),
            per_page: 100,
            max_pages: 50,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            user_agent: format!("kustomap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Retry policy settings shared by every provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts for a transient failure, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each following attempt.
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

/// Scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Upper bound on concurrent manifest downloads.
    pub max_parallel_fetches: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_parallel_fetches: 4,
        }
    }
}

/// Complete settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GitHubSettings,
    pub gitlab: GitLabSettings,
    pub http: HttpSettings,
    pub retry: RetrySettings,
    pub scan: ScanSettings,
}

/// Optional access tokens, one per provider family.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
}

impl Credentials {
    pub fn new(github_token: Option<String>, gitlab_token: Option<String>) -> Self {
        // Blank tokens (e.g. `GITHUB_TOKEN=`) behave like absent ones.
        let clean = |token: Option<String>| token.filter(|t| !t.trim().is_empty());
        Self {
            github_token: clean(github_token),
            gitlab_token: clean(gitlab_token),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("github_token", &mask(&self.github_token))
            .field("gitlab_token", &mask(&self.gitlab_token))
            .finish()
    }
}

/// Parses a YAML string into `Settings`.
///
/// An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings: Settings = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Settings must be a YAML mapping with github, gitlab, http, retry or scan sections".to_string()),
    })?;

    if settings.retry.max_attempts == 0 {
        return Err(Error::ConfigParse {
            message: "retry.max_attempts must be at least 1".to_string(),
            hint: None,
        });
    }

    Ok(settings)
}

/// Parse `Settings` from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Load settings from `explicit` if given, else from the default location if
/// a file exists there, else return the defaults.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        debug!("Loading settings from {}", path.display());
        return from_file(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!("Loading settings from {}", default_path.display());
        from_file(default_path)
    } else {
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_empty_yields_defaults() {
        let settings = parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.base_delay_ms, 1000);
        assert_eq!(settings.gitlab.api_path, "/api/v4");
    }

    #[test]
    fn test_parse_partial_sections() {
        let yaml = r#"
github:
  api_url: https://ghe.example.com/api/v3
scan:
  max_parallel_fetches: 8
"#;
        let settings = parse(yaml).unwrap();
        assert_eq!(settings.github.api_url, "https://ghe.example.com/api/v3");
        // Untouched fields keep their defaults
        assert_eq!(settings.github.raw_url, "https://raw.githubusercontent.com");
        assert_eq!(settings.scan.max_parallel_fetches, 8);
        assert_eq!(settings.http.read_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_rejects_zero_attempts() {
        let result = parse("retry:\n  max_attempts: 0\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let result = parse("- just\n- a list\n");
        let error = result.unwrap_err();
        assert!(error.to_string().contains("Configuration parsing error"));
        assert!(error.to_string().contains("hint:"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "gitlab:\n  per_page: 20").unwrap();
        let settings = from_file(file.path()).unwrap();
        assert_eq!(settings.gitlab.per_page, 20);
        assert_eq!(settings.gitlab.max_pages, 50);
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let result = load(Some(Path::new("/nonexistent/kustomap.yaml")));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_credentials_blank_tokens_are_absent() {
        let creds = Credentials::new(Some("  ".to_string()), Some("glpat-123".to_string()));
        assert_eq!(creds.github_token, None);
        assert_eq!(creds.gitlab_token.as_deref(), Some("glpat-123"));
    }

    #[test]
    fn test_credentials_debug_redacts_tokens() {
        let creds = Credentials::new(Some("ghp_secret".to_string()), None);
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
