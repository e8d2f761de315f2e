//! Default values for kustomap.
//!
//! This module provides centralized constants and default locations used
//! across the library and the commands, so they are defined exactly once.

use std::path::PathBuf;

/// The two recognized manifest file names, in order of preference.
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["kustomization.yaml", "kustomization.yml"];

/// Directory names never descended into by a local scan (besides hidden ones).
pub const SKIPPED_DIRECTORIES: [&str; 1] = ["node_modules"];

/// Branch assumed for a short `https://github.com/<owner>/<repo>` URL.
pub const DEFAULT_BRANCH: &str = "main";

/// Number of attempts made for a transient provider failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled for every following attempt.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Returns the default settings file location.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/kustomap/config.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/kustomap/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\kustomap\config.yaml`
///
/// Falls back to `.kustomap.yaml` in the current directory if the platform
/// configuration directory cannot be determined.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("kustomap").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from(".kustomap.yaml"))
}
