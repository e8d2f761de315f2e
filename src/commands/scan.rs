//! # Scan Command Implementation
//!
//! Scans a repository URL or a local directory and prints the dependency
//! graph between its kustomization manifests.
//!
//! ## Output Formats
//!
//! - **text**: A summary of manifests, references and cycles
//! - **json**: `{rootPath, nodes, edges, cycles, warnings}` for graph viewers
//! - **tree**: Top-level overlays with the manifests they pull in beneath them
//!
//! Warnings go to stderr. The command succeeds whenever a graph was built,
//! cycles included.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};

use super::{print_warnings, render, run_scan, Context};
use kustomap::output::{marker, Marker};

/// Output format for the scan command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Tree,
}

/// Scan a source and print its dependency graph
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Repository URL (https://...) or local directory
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `scan` command.
pub fn execute(args: ScanArgs, context: &Context) -> Result<()> {
    let report = run_scan(context, &args.source)?;

    let rendered = match args.format {
        Format::Text => render::text(&report, &context.output),
        Format::Json => render::json(&report)?,
        Format::Tree => render::tree(&report)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} manifest(s) to {}",
                marker(&context.output, Marker::Success),
                report.graph.node_count(),
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    print_warnings(&context.output, &report.warnings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kustomap::config::{Credentials, Settings};
    use kustomap::output::OutputConfig;
    use tempfile::TempDir;

    fn context() -> Context {
        Context::new(Settings::default(), Credentials::default(), OutputConfig { use_color: false })
    }

    #[test]
    fn test_scan_missing_directory() {
        let args = ScanArgs {
            source: "/nonexistent/kustomize/tree".to_string(),
            format: Format::Text,
            output: None,
        };
        let err = execute(args, &context()).unwrap_err();
        assert!(err.to_string().contains("Directory not found"));
    }

    #[test]
    fn test_scan_writes_json_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("base")).unwrap();
        fs::write(dir.path().join("base/kustomization.yaml"), "resources: []\n").unwrap();
        let out = dir.path().join("graph.json");

        let args = ScanArgs {
            source: dir.path().to_string_lossy().into_owned(),
            format: Format::Json,
            output: Some(out.clone()),
        };
        execute(args, &context()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(value["rootPath"], "base");
    }

    #[test]
    fn test_scan_empty_directory_has_hint() {
        let dir = TempDir::new().unwrap();
        let args = ScanArgs {
            source: dir.path().to_string_lossy().into_owned(),
            format: Format::Text,
            output: None,
        };
        let err = execute(args, &context()).unwrap_err();
        assert!(err.to_string().contains("hint:"));
    }
}
