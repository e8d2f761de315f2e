//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands::{self, Context};
use kustomap::config::{self, Credentials};
use kustomap::output::OutputConfig;

/// kustomap - Map the dependencies between kustomization overlays
#[derive(Parser, Debug)]
#[command(name = "kustomap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    /// Path to a settings file
    #[arg(short, long, global = true, value_name = "FILE", env = "KUSTOMAP_CONFIG")]
    config: Option<PathBuf>,

    /// GitHub access token
    #[arg(long, global = true, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitLab access token
    #[arg(long, global = true, value_name = "TOKEN", env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a repository URL or local directory and print its dependency graph
    Scan(commands::scan::ScanArgs),

    /// Scan a source and print only its dependency cycles
    Cycles(commands::cycles::CyclesArgs),

    /// Resolve a repository URL to its branch and sub-path
    Resolve(commands::resolve::ResolveArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        if let Commands::Completions(args) = self.command {
            return commands::completions::execute(args);
        }

        let settings = config::load(self.config.as_deref())?;
        let credentials = Credentials::new(self.github_token, self.gitlab_token);
        let context = Context::new(settings, credentials, output);

        match self.command {
            Commands::Scan(args) => commands::scan::execute(args, &context),
            Commands::Cycles(args) => commands::cycles::execute(args, &context),
            Commands::Resolve(args) => commands::resolve::execute(args, &context),
            Commands::Completions(_) => Ok(()),
        }
    }
}

/// Initialize `env_logger` on stderr. `RUST_LOG`, when set, overrides the
/// `--log-level` flag.
fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Warn);
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(filter)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    // A logger may already be installed when running inside tests.
    let _ = builder.try_init();
}
