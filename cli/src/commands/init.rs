use std::path::PathBuf;

use clap::Args;
use perfline_tracker::TimelineStore;

use crate::commands::collect::{self, CollectArgs, ModeArg};
use crate::error::{CliError, Result};
use crate::AppContext;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to the raw benchmark JSON file for the fresh baseline
    pub benchmark_file: PathBuf,

    /// Label for the baseline entry
    #[arg(long, default_value = "baseline")]
    pub label: String,

    /// Allow initialization with uncommitted git changes
    #[arg(long)]
    pub allow_dirty: bool,

    /// Skip confirmation prompts
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let mut store = TimelineStore::open(&ctx.backend, &ctx.registry.name)?;

    if !store.is_empty() {
        if !args.force {
            let prompt = format!(
                "Discard the existing timeline ({} entries) and start fresh?",
                store.len()
            );
            if !ctx.output.confirm(&prompt)? {
                return Err(CliError::Cancelled);
            }
        }
        if let Some(backup) = store.backup("fresh_init")? {
            ctx.output.print_info(&format!("Backed up existing timeline: {}", backup.display()));
        }
        store.clear()?;
        ctx.output.print_info("Removed existing timeline");
    }
    drop(store);

    collect::run(
        CollectArgs {
            benchmark_file: args.benchmark_file,
            label: args.label.clone(),
            mode: ModeArg::Baseline,
            allow_dirty: args.allow_dirty,
            force: args.force,
            provenance: None,
        },
        ctx,
    )?;

    ctx.output.print_success(&format!("Initialized fresh timeline with baseline: {}", args.label));
    Ok(())
}
