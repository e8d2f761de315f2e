//! # Cycles Command Implementation
//!
//! Scans a source and prints only the dependency cycles found in it, as
//! manifest paths. With `--fail-on-cycle` a non-empty result makes the
//! command exit with status 1, which suits CI checks.

use anyhow::Result;
use clap::Args;

use super::{print_warnings, render, run_scan, Context};
use kustomap::output::{marker, Marker};

/// Print the dependency cycles of a source
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Repository URL (https://...) or local directory
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Exit with a non-zero status when a cycle is found
    #[arg(long)]
    pub fail_on_cycle: bool,
}

/// Execute the `cycles` command.
pub fn execute(args: CyclesArgs, context: &Context) -> Result<()> {
    let report = run_scan(context, &args.source)?;
    let output = &context.output;

    // Cycles are printed below; only the other warnings go to stderr.
    let others: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.category() != "cycle")
        .cloned()
        .collect();
    print_warnings(output, &others);

    let cycles = report.cycle_paths();
    if cycles.is_empty() {
        println!("{} No cycles found", marker(output, Marker::Success));
        return Ok(());
    }

    for cycle in &cycles {
        println!("{} {}", marker(output, Marker::Cycle), render::cycle_line(cycle));
    }

    if args.fail_on_cycle {
        anyhow::bail!("{} dependency cycle(s) found", cycles.len());
    }
    Ok(())
}
