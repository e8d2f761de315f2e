//! # kustomap CLI
//!
//! Binary entry point for the `kustomap` command-line tool. It parses the
//! arguments with `clap`, runs the selected command, and lets `anyhow`
//! report any error with a non-zero exit status.
//!
//! The scanning logic lives in the `kustomap` library crate; the binary is a
//! thin presentation layer over it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
