//! # CLI Command Implementations
//!
//! Each subcommand of the `kustomap` tool lives in its own file, with an
//! `Args` struct derived with `clap` and an `execute` function that calls into
//! the `kustomap` library.
//!
//! The shared [`Context`] carries what every scanning command needs: the
//! loaded settings, the provider credentials and the output configuration.

pub mod completions;
pub mod cycles;
pub mod render;
pub mod resolve;
pub mod scan;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use kustomap::config::{Credentials, Settings};
use kustomap::output::{marker, warning_text, Marker, OutputConfig};
use kustomap::path::is_remote_reference;
use kustomap::phases::{ScanReport, ScanWarning, Scanner};
use kustomap::suggestions;

/// Settings, credentials and output preferences shared by the commands
#[derive(Debug)]
pub struct Context {
    pub settings: Settings,
    pub credentials: Credentials,
    pub output: OutputConfig,
}

impl Context {
    pub fn new(settings: Settings, credentials: Credentials, output: OutputConfig) -> Self {
        Self {
            settings,
            credentials,
            output,
        }
    }

    pub fn scanner(&self) -> Result<Scanner> {
        Ok(Scanner::new(self.settings.clone(), self.credentials.clone())?)
    }
}

/// Scan `source`, showing a spinner on stderr for remote scans when stderr is
/// a terminal. Library errors are converted into hint-bearing CLI errors.
pub fn run_scan(context: &Context, source: &str) -> Result<ScanReport> {
    let remote = is_remote_reference(source);
    if !remote && !Path::new(source).is_dir() {
        return Err(suggestions::path_not_found(Path::new(source)));
    }

    let mut scanner = context.scanner()?;
    let spinner = if remote && console::Term::stderr().is_term() {
        Some(spinner(source))
    } else {
        None
    };

    let result = scanner.scan(source);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result.map_err(suggestions::explain)
}

fn spinner(source: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(format!("Scanning {}", source));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Print warnings to stderr, one per line.
pub fn print_warnings(output: &OutputConfig, warnings: &[ScanWarning]) {
    for warning in warnings {
        eprintln!(
            "{} {}",
            marker(output, Marker::Warning),
            warning_text(output, &warning.to_string())
        );
    }
}
