//! # Output Configuration
//!
//! Controls how the CLI renders scan results: whether color is used, and
//! which markers precede nodes, warnings and cycles.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ```
//! use kustomap::output::{marker, Marker, OutputConfig};
//!
//! let config = OutputConfig::from_env_and_flag("never");
//! assert_eq!(marker(&config, Marker::Warning), "warning:");
//! ```

use std::env;

use console::style;

use crate::node::NodeKind;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the value of
    /// `--color` (`always`, `never` or `auto`).
    ///
    /// In auto mode colors are disabled when `NO_COLOR` is set (even empty),
    /// when `CLICOLOR=0`, when `TERM=dumb`, or when stdout is not a terminal
    /// (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Apply this configuration to the `console` crate's global switches.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Line markers used in text output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Success,
    Warning,
    Cycle,
}

/// Returns the marker text for `kind`: a symbol when colors are enabled,
/// a plain word otherwise.
pub fn marker(config: &OutputConfig, kind: Marker) -> &'static str {
    match (kind, config.use_color) {
        (Marker::Success, true) => "✔",
        (Marker::Success, false) => "ok:",
        (Marker::Warning, true) => "⚠",
        (Marker::Warning, false) => "warning:",
        (Marker::Cycle, true) => "↻",
        (Marker::Cycle, false) => "cycle:",
    }
}

/// Render a node kind, colored when enabled.
pub fn kind_label(config: &OutputConfig, kind: NodeKind) -> String {
    let text = format!("[{}]", kind);
    if !config.use_color {
        return text;
    }
    match kind {
        NodeKind::Base => style(text).cyan().to_string(),
        NodeKind::Overlay => style(text).green().to_string(),
        NodeKind::Component => style(text).magenta().to_string(),
    }
}

/// Render `text` as a warning, colored when enabled.
pub fn warning_text(config: &OutputConfig, text: &str) -> String {
    if config.use_color {
        style(text).yellow().to_string()
    } else {
        text.to_string()
    }
}
