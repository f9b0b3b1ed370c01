use clap::Args;
use perfline_tracker::{check_consistency, ComparisonEngine, TimelineEntry, TimelineStore};

use crate::error::{CliError, Result};
use crate::AppContext;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Include memory and count metrics, not just time metrics
    #[arg(long)]
    pub all_metrics: bool,

    /// Label of the entry to compare against (default: the baseline,
    /// or the first entry when none is marked)
    #[arg(long)]
    pub baseline: Option<String>,

    /// Label of the entry to compare (default: the most recent)
    #[arg(long)]
    pub candidate: Option<String>,
}

pub fn run(args: CompareArgs, ctx: &AppContext) -> Result<()> {
    let store = TimelineStore::open_existing(&ctx.backend, &ctx.registry.name)?;

    if store.len() < 2 {
        ctx.output.print_info("Need at least 2 runs to compare.");
        return Ok(());
    }

    let contexts: Vec<_> = store.entries().iter().map(|e| e.device.clone()).collect();
    let inconsistencies = check_consistency(&contexts);
    ctx.output.print_device_report(store.entries(), &inconsistencies);

    let baseline = select(&store, args.baseline.as_deref(), || {
        store.baseline().unwrap_or(&store.entries()[0])
    })?;
    let candidate = select(&store, args.candidate.as_deref(), || {
        &store.entries()[store.len() - 1]
    })?;

    let engine = ComparisonEngine::new(ctx.registry.clone());
    let comparison = engine.compare_entry(baseline, candidate);
    ctx.output.print_comparison(&comparison, &ctx.registry, args.all_metrics)?;

    ctx.output.print_improvement_summary(&engine.improvement_summary(store.entries()));
    Ok(())
}

fn select<'a, B: perfline_tracker::TimelineBackend>(
    store: &'a TimelineStore<B>,
    label: Option<&str>,
    fallback: impl FnOnce() -> &'a TimelineEntry,
) -> Result<&'a TimelineEntry> {
    match label {
        Some(label) => store
            .find_by_label(label)
            .map(|(_, entry)| entry)
            .ok_or_else(|| CliError::InvalidArgument(format!("no entry labeled '{label}'"))),
        None => Ok(fallback()),
    }
}
