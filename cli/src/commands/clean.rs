use clap::Args;
use perfline_tracker::TimelineStore;

use crate::error::{CliError, Result};
use crate::AppContext;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Remove every entry, not just experimental (dirty) ones
    #[arg(long)]
    pub all: bool,

    /// Skip the backup before removal
    #[arg(long)]
    pub no_backup: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: CleanArgs, ctx: &AppContext) -> Result<()> {
    let mut store = TimelineStore::open(&ctx.backend, &ctx.registry.name)?;
    if store.is_empty() {
        ctx.output.print_info("No timeline entries to clean.");
        return Ok(());
    }

    if args.all {
        return clean_all(&mut store, &args, ctx);
    }

    let dirty: Vec<(usize, String)> = store
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| e.provenance.is_dirty())
        .map(|(i, e)| (i, e.label.clone()))
        .collect();

    if dirty.is_empty() {
        ctx.output.print_info("No experimental (dirty) entries found.");
        return Ok(());
    }

    ctx.output.print_info(&format!("Found {} experimental entries:", dirty.len()));
    for (index, label) in &dirty {
        ctx.output.print_info(&format!("  {index}: {label}"));
    }

    if !args.force && !ctx.output.confirm(&format!("Remove {} entries?", dirty.len()))? {
        return Err(CliError::Cancelled);
    }

    if !args.no_backup {
        if let Some(backup) = store.backup("clean")? {
            ctx.output.print_info(&format!("Backup created: {}", backup.display()));
        }
    }

    let removed = store.prune_dirty()?;
    ctx.output.print_success(&format!(
        "Removed {} experimental entries; {} remaining",
        removed.len(),
        store.len()
    ));
    Ok(())
}

fn clean_all(
    store: &mut TimelineStore<&perfline_tracker::FileBackend>,
    args: &CleanArgs,
    ctx: &AppContext,
) -> Result<()> {
    let count = store.len();
    if !args.force && !ctx.output.confirm(&format!("Remove ALL {count} timeline entries?"))? {
        return Err(CliError::Cancelled);
    }

    if !args.no_backup {
        if let Some(backup) = store.backup("clean_all")? {
            ctx.output.print_info(&format!("Backup created: {}", backup.display()));
        }
    }

    store.clear()?;
    ctx.output.print_success(&format!("Cleaned all timeline data ({count} entries removed)"));
    ctx.output.print_info("Ready for fresh baseline initialization.");
    Ok(())
}
