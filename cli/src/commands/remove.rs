use std::collections::BTreeSet;

use clap::Args;
use perfline_tracker::TimelineStore;

use crate::error::{CliError, Result};
use crate::AppContext;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Entry indices to remove (see 'perflinectl list')
    #[arg(required = true)]
    pub indices: Vec<usize>,

    /// Skip the backup before removal
    #[arg(long)]
    pub no_backup: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: RemoveArgs, ctx: &AppContext) -> Result<()> {
    let mut store = TimelineStore::open_existing(&ctx.backend, &ctx.registry.name)?;
    let indices: BTreeSet<usize> = args.indices.iter().copied().collect();

    ctx.output.print_info("Entries to be removed:");
    for &index in &indices {
        match store.entries().get(index) {
            Some(entry) => ctx.output.print_info(&format!(
                "  {}: {} ({})",
                index, entry.label, entry.provenance
            )),
            None => ctx.output.print_warning(&format!("  {index}: out of range")),
        }
    }

    if !args.force && !ctx.output.confirm(&format!("Remove {} entries?", indices.len()))? {
        return Err(CliError::Cancelled);
    }

    if !args.no_backup {
        if let Some(backup) = store.backup("remove")? {
            ctx.output.print_info(&format!("Backup created: {}", backup.display()));
        }
    }

    let removed = store.remove(&indices)?;
    for entry in &removed {
        ctx.output.print_success(&format!("Removed: {}", entry.label));
    }
    ctx.output.print_info(&format!("Timeline updated: {} entries remaining", store.len()));
    Ok(())
}
