mod logging;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use careseed_core::{Error as CoreError, ManifestStore};
use careseed_filter::{FilterError, filter_file};
use careseed_generate::{
    FixtureEmitter, GenerationError, GenerationReport, Stage, WriteMode, write_script,
};
use logging::{LoggingError, init_logging};
use settings::{Settings, SettingsError};

#[derive(Debug, Error)]
enum CliError {
    #[error("manifest error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "careseed", version, about = "Seed data generator for the care staffing schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate INSERT statements and update the ID manifest.
    Generate(GenerateArgs),
    /// Drop sections that cannot be replayed against a hosted database.
    Filter(FilterArgs),
    /// Print identifier counts of a manifest.
    Manifest(ManifestArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// ID manifest read before and written after generation.
    #[arg(long, default_value = "SEED_DATA_MANIFEST.json")]
    manifest: PathBuf,
    /// SQL script output path.
    #[arg(long, default_value = "seed_data.sql")]
    out: PathBuf,
    /// Entity types to generate: foundation, operations or all.
    #[arg(long, default_value = "all")]
    stage: Stage,
    /// Start from an empty manifest instead of loading it.
    #[arg(long, default_value_t = false)]
    fresh: bool,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for reproducible output; overrides the settings file.
    #[arg(long)]
    seed: Option<u64>,
    /// Write the generation report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write JSON logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Script produced by `generate`.
    #[arg(long, default_value = "seed_data.sql")]
    input: PathBuf,
    /// Filtered script output path.
    #[arg(long, default_value = "seed_data_filtered.sql")]
    output: PathBuf,
    /// Entity names to drop; replaces the configured list.
    #[arg(long = "exclude", value_name = "NAME")]
    excluded: Vec<String>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write JSON logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ManifestArgs {
    #[arg(long, default_value = "SEED_DATA_MANIFEST.json")]
    manifest: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Filter(args) => run_filter(args),
        Command::Manifest(args) => run_manifest(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_logging(args.log_file.as_deref())?;
    tracing::info!(
        event = "run_started",
        stage = %args.stage,
        manifest = %args.manifest.display(),
        fresh = args.fresh
    );
    let timer = Instant::now();

    let report = generate(&args)?;

    println!("[OK] Generated {} statements", report.statements);
    for table in &report.tables {
        match table.limited_by {
            Some(pool) => println!(
                "  - {}: {} of {} (limited by {pool})",
                table.entity, table.rows_generated, table.rows_requested
            ),
            None => println!("  - {}: {}", table.entity, table.rows_generated),
        }
    }
    println!("[OK] Saved to: {}", args.out.display());
    println!("[OK] Updated: {}", args.manifest.display());

    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

/// Run the emitter and write its artifacts. The report goes first; the
/// script and the manifest are written last, one right after the other,
/// so a failure before them leaves both untouched.
fn generate(args: &GenerateArgs) -> Result<GenerationReport, CliError> {
    let settings = Settings::load(args.config.as_deref())?;
    let mut options = settings.generate;
    if args.seed.is_some() {
        options.seed = args.seed;
    }

    let store = ManifestStore::new(&args.manifest);
    let (mut registry, writer) = if args.fresh {
        store.start_empty()
    } else {
        store.load()?
    };

    let result = FixtureEmitter::new(options).run(&mut registry, args.stage)?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_vec_pretty(&result.report)?)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    let mode = match args.stage {
        Stage::Operations => WriteMode::Append,
        Stage::Foundation | Stage::All => WriteMode::Truncate,
    };
    let bytes = write_script(&args.out, &result.script, mode)?;
    tracing::info!(event = "script_written", path = %args.out.display(), bytes, ?mode);

    writer.persist(&registry)?;
    tracing::info!(event = "manifest_written", path = %args.manifest.display());

    Ok(result.report)
}

fn run_filter(args: FilterArgs) -> Result<(), CliError> {
    init_logging(args.log_file.as_deref())?;
    let mut rules = Settings::load(args.config.as_deref())?.filter;
    if !args.excluded.is_empty() {
        rules.excluded = args.excluded;
    }

    let outcome = filter_file(&args.input, &args.output, &rules)?;

    for skipped in &outcome.skipped {
        println!(
            "[SKIP] {} ({:?})",
            skipped.marker.as_deref().unwrap_or("<preamble>"),
            skipped.reason
        );
    }
    for section in &outcome.kept {
        println!("[OK] {}", section.name());
    }
    println!(
        "\n[OK] Saved {} sections to: {}",
        outcome.kept.len(),
        args.output.display()
    );
    Ok(())
}

fn run_manifest(args: ManifestArgs) -> Result<(), CliError> {
    let (registry, _writer) = ManifestStore::new(&args.manifest).load()?;
    let counts = registry.counts();
    for (key, count) in &counts {
        println!("{key:<20} {count}");
    }
    println!("{:<20} {}", "total", counts.values().sum::<usize>());
    Ok(())
}
