use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use perfline_tracker::{FileBackend, MetricRegistry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod git;
mod output;

use commands::*;
use error::{CliError, Result};
use output::{OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "perflinectl")]
#[command(about = "Perfline CLI - track benchmark runs and spot regressions over time")]
#[command(version)]
#[command(long_about = "
Perfline keeps an ordered timeline of benchmark runs per optimization
profile and classifies metric changes between runs as improvement,
regression, or noise.

Examples:
  perflinectl init baseline.json                      # Start a timeline with a baseline
  perflinectl collect run.json bitmap_pooling         # Record an optimization run
  perflinectl compare                                 # Compare latest run to the baseline
  perflinectl list                                    # Show all recorded runs
  perflinectl clean                                   # Drop runs from dirty builds
")]
struct Cli {
    /// Directory holding timeline data
    #[arg(long, global = true, env = "PERFLINE_DATA_DIR", default_value = "benchmark_results")]
    data_dir: PathBuf,

    /// Built-in optimization profile
    #[arg(long, global = true, env = "PERFLINE_PROFILE", default_value = "atlas")]
    profile: String,

    /// Load the profile from a TOML file instead of the built-ins
    #[arg(long, global = true)]
    profile_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormatArg {
    Table,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Record a benchmark run into the timeline
    Collect(CollectArgs),

    /// Start a fresh timeline with a new baseline
    Init(InitArgs),

    /// List recorded runs with their indices
    List,

    /// Compare runs and classify metric changes
    Compare(CompareArgs),

    /// Remove timeline entries by index
    Remove(RemoveArgs),

    /// Remove experimental (dirty) entries, or everything with --all
    Clean(CleanArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Shared state every command operates against
pub struct AppContext {
    pub registry: MetricRegistry,
    pub backend: FileBackend,
    pub data_dir: PathBuf,
    pub output: OutputManager,
}

fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return;
    }

    if let Err(e) = run_command(cli) {
        eprintln!("{}", error::format_error(&e));
        process::exit(e.exit_code());
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let registry = match &cli.profile_file {
        Some(path) => MetricRegistry::from_toml_file(path)?,
        None => MetricRegistry::builtin(&cli.profile)?,
    };
    info!(profile = %registry.name, data_dir = %cli.data_dir.display(), "profile loaded");

    let colored =
        !cli.no_color && !cli.quiet && console::Term::stdout().features().colors_supported();
    let ctx = AppContext {
        registry,
        backend: FileBackend::new(&cli.data_dir),
        data_dir: cli.data_dir.clone(),
        output: OutputManager::new(OutputFormat::from(cli.format), colored),
    };

    match cli.command {
        Commands::Collect(args) => commands::collect::run(args, &ctx),
        Commands::Init(args) => commands::init::run(args, &ctx),
        Commands::List => commands::list::run(&ctx),
        Commands::Compare(args) => commands::compare::run(args, &ctx),
        Commands::Remove(args) => commands::remove::run(args, &ctx),
        Commands::Clean(args) => commands::clean::run(args, &ctx),
        Commands::Completions { .. } => unreachable!("Completions handled earlier"),
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("perflinectl={log_level},perfline_tracker={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::{generate, Generator};
    use std::io;

    fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
        generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    }

    let mut cmd = Cli::command();
    print_completions(shell, &mut cmd);
}
