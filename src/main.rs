use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use tracker_etl::config::Config;
use tracker_etl::error::Result;
use tracker_etl::logging;
use tracker_etl::pipeline;
use tracker_etl::record::RunSummary;
use tracker_etl::schema::SchemaDef;
use tracker_etl::sources::{CsvFileSource, RecordSource};

#[derive(Parser)]
#[command(name = "tracker-etl")]
#[command(about = "Kitchen tracker schema validation and quarantine pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one CSV batch against a schema
    Validate {
        /// Input CSV file
        #[arg(long)]
        input: PathBuf,
        /// Schema reference name, resolved to <schemas-dir>/<ref>.json
        #[arg(long)]
        schema_ref: String,
        /// Directory holding schema definition files
        #[arg(long, default_value = "config/schemas")]
        schemas_dir: PathBuf,
        /// Validated output path (default: data/output/<ref>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Quarantine output path (default: data/quarantine/<ref>_invalid.csv)
        #[arg(long)]
        quarantine: Option<PathBuf>,
    },
    /// Run every source declared in the run config
    Run {
        /// Path to the TOML run config
        #[arg(long, default_value = "config/etl.toml")]
        config: PathBuf,
    },
}

fn run_source(
    source: &dyn RecordSource,
    schema_ref: &str,
    schemas_dir: &Path,
    output_path: &Path,
    quarantine_path: &Path,
) -> Result<RunSummary> {
    let schema = SchemaDef::load(schema_ref, schemas_dir)?;
    let batch = source.fetch_batch()?;
    pipeline::run_batch(&batch, &schema, output_path, quarantine_path)
}

fn print_summary(source_id: &str, summary: &RunSummary) {
    println!("\n📊 Pipeline Results for {}:", source_id);
    println!("   Total rows: {}", summary.total);
    println!("   Valid:      {}", summary.valid_count);
    println!("   Invalid:    {}", summary.invalid_count);
    println!("   Output file: {}", summary.output_path.display());
    match &summary.quarantine_path {
        Some(path) => println!("   Quarantine:  {}", path.display()),
        None => println!("   Quarantine:  none (all rows passed)"),
    }
}

/// Returns the number of quarantined rows across all executed runs.
fn execute(cli: Cli) -> Result<usize> {
    match cli.command {
        Commands::Validate {
            input,
            schema_ref,
            schemas_dir,
            output,
            quarantine,
        } => {
            let output_path =
                output.unwrap_or_else(|| PathBuf::from(format!("data/output/{schema_ref}.csv")));
            let quarantine_path = quarantine.unwrap_or_else(|| {
                PathBuf::from(format!("data/quarantine/{schema_ref}_invalid.csv"))
            });

            let source = CsvFileSource::new(schema_ref.clone(), input);
            let summary = run_source(
                &source,
                &schema_ref,
                &schemas_dir,
                &output_path,
                &quarantine_path,
            )?;
            print_summary(source.source_id(), &summary);
            Ok(summary.invalid_count)
        }
        Commands::Run { config } => {
            let config = Config::load(&config)?;
            let mut invalid_total = 0;

            for source_config in &config.sources {
                let span = tracing::info_span!("Running source", source = %source_config.id);
                let _enter = span.enter();
                info!("Starting pipeline");

                let output_path = config.output_dir.join(format!("{}.csv", source_config.id));
                let quarantine_path = config
                    .quarantine_dir
                    .join(format!("{}_invalid.csv", source_config.id));

                let source = CsvFileSource::new(source_config.id.clone(), &source_config.path);
                let summary = run_source(
                    &source,
                    &source_config.schema_ref,
                    &config.schemas_dir,
                    &output_path,
                    &quarantine_path,
                )?;
                info!("Pipeline finished");
                print_summary(&source_config.id, &summary);
                invalid_total += summary.invalid_count;
            }

            Ok(invalid_total)
        }
    }
}

fn main() -> ExitCode {
    logging::init_logging();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(invalid) => {
            // Nonzero so scheduled runs surface quarantined rows
            println!("\n⚠️  {} row(s) quarantined", invalid);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            eprintln!("❌ Pipeline failed: {}", e);
            ExitCode::from(2)
        }
    }
}
