use std::path::PathBuf;

use clap::{Args, ValueEnum};
use perfline_tracker::{
    ComparisonEngine, EntryMode, Provenance, RawReport, TimelineEntry, TimelineError,
    TimelineStore,
};
use tracing::info;

use crate::error::{CliError, Result};
use crate::git;
use crate::AppContext;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Path to the raw benchmark JSON file
    pub benchmark_file: PathBuf,

    /// Label naming this optimization (e.g. bitmap_pooling)
    pub label: String,

    /// How this run interacts with the existing timeline
    #[arg(long, value_enum, default_value_t = ModeArg::Optimization)]
    pub mode: ModeArg,

    /// Allow collection with uncommitted git changes
    #[arg(long)]
    pub allow_dirty: bool,

    /// Skip confirmation prompts (duplicate labels, dirty state)
    #[arg(long)]
    pub force: bool,

    /// Override the provenance tag instead of asking git
    #[arg(long)]
    pub provenance: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Optimization,
    Baseline,
    UpdateBaseline,
}

impl From<ModeArg> for EntryMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Optimization => EntryMode::Optimization,
            ModeArg::Baseline => EntryMode::Baseline,
            ModeArg::UpdateBaseline => EntryMode::UpdateBaseline,
        }
    }
}

pub fn run(args: CollectArgs, ctx: &AppContext) -> Result<()> {
    if !args.benchmark_file.exists() {
        return Err(CliError::FileNotFound {
            path: args.benchmark_file.display().to_string(),
        });
    }

    let provenance = resolve_provenance(&args, ctx);
    if provenance.is_dirty() && !args.allow_dirty && !args.force {
        ctx.output.print_warning("You have uncommitted changes; this result may not be reproducible.");
        ctx.output.print_info(&format!("   Git state: {provenance}"));
        if !ctx.output.confirm("Continue anyway?")? {
            return Err(CliError::Cancelled);
        }
    }

    let spinner = ctx.output.create_spinner("Reading benchmark report...");
    let report = RawReport::from_file(&args.benchmark_file)?;
    spinner.finish_and_clear();

    let source_file = args
        .benchmark_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.benchmark_file.display().to_string());

    let entry = TimelineEntry::from_report(
        &ctx.registry,
        &report,
        &args.label,
        args.mode.into(),
        provenance,
        source_file,
    );

    let mut store = TimelineStore::open(&ctx.backend, &ctx.registry.name)?;
    match args.mode {
        ModeArg::Optimization => append_with_confirmation(&mut store, entry.clone(), &args, ctx)?,
        ModeArg::Baseline => {
            store.replace_baseline(entry.clone())?;
            ctx.output.print_success(&format!("Established new baseline: {}", args.label));
        }
        ModeArg::UpdateBaseline => {
            if let Some(backup) = store.backup("baseline_update")? {
                ctx.output.print_info(&format!("Backup created: {}", backup.display()));
            }
            store.update_baseline(entry.clone())?;
            ctx.output.print_success(&format!("Updated baseline: {}", args.label));
        }
    }

    info!(label = %args.label, entries = store.len(), "run collected");
    print_summary(&entry, &store, ctx);
    Ok(())
}

fn resolve_provenance(args: &CollectArgs, ctx: &AppContext) -> Provenance {
    if let Some(tag) = &args.provenance {
        return Provenance::new(tag.clone());
    }
    let repo_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let results_dir = ctx
        .data_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "benchmark_results".to_string());
    git::provenance(&repo_dir, &results_dir)
}

fn append_with_confirmation(
    store: &mut TimelineStore<&perfline_tracker::FileBackend>,
    entry: TimelineEntry,
    args: &CollectArgs,
    ctx: &AppContext,
) -> Result<()> {
    match store.append(entry.clone()) {
        Ok(()) => {
            ctx.output.print_success(&format!("Collected run: {}", args.label));
            Ok(())
        }
        Err(TimelineError::DuplicateLabel { label }) => {
            if !args.force {
                ctx.output.print_warning(&format!("Optimization label '{label}' already exists."));
                ctx.output.print_info("   This will add a new entry, not overwrite the existing one.");
                if !ctx.output.confirm(&format!("Continue with duplicate label '{label}'?"))? {
                    ctx.output.print_info(&format!("Suggested alternative: '{label}_v2'"));
                    return Err(CliError::Cancelled);
                }
            }
            store.force_append(entry)?;
            ctx.output.print_success(&format!("Collected run: {label} (duplicate label)"));
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}

fn print_summary(entry: &TimelineEntry, store: &TimelineStore<&perfline_tracker::FileBackend>, ctx: &AppContext) {
    if ctx.output.is_json() {
        return;
    }

    ctx.output.print_info(&format!("Device: {}", entry.device.summary()));
    ctx.output.print_info(&format!("Provenance: {}", entry.provenance));

    let found: Vec<&str> = entry
        .snapshots
        .iter()
        .filter(|(_, s)| s.found)
        .map(|(name, _)| name.as_str())
        .collect();
    let missing: Vec<&str> = entry
        .snapshots
        .iter()
        .filter(|(_, s)| !s.found)
        .map(|(name, _)| name.as_str())
        .collect();
    ctx.output.print_info(&format!("Tests found: {}", found.join(", ")));
    if !missing.is_empty() {
        ctx.output.print_warning(&format!("Tests missing from report: {}", missing.join(", ")));
    }

    if let Some(headline) =
        entry.headline_value(&ctx.registry.primary_test, &ctx.registry.primary_metric)
    {
        ctx.output.print_info(&format!(
            "{}: {:.1}ms (target {:.0}ms)",
            ctx.registry.primary_metric, headline, ctx.registry.target_time_ms
        ));
    }

    ctx.output.print_info(&format!("Timeline entries: {}", store.len()));

    // progress against the baseline once there is something to compare
    if store.len() >= 2 {
        if let Some(baseline) = store.baseline() {
            let engine = ComparisonEngine::new(ctx.registry.clone());
            let comparison = engine.compare_entry(baseline, entry);
            if let Some(headline) = comparison.headline {
                ctx.output.print_info(&format!(
                    "Since baseline ({}): {}",
                    baseline.label,
                    ctx.output.format_change(&headline)
                ));
            }
        }
    }
}
