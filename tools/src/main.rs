//! ab-runner: command-line driver for the A/B-testing analytics toolkit.
//!
//! Usage:
//!   ab-runner --db warehouse.db create-tables
//!   ab-runner --db warehouse.db load --data-dir ./data
//!   ab-runner --db warehouse.db simulate --seed 42
//!   ab-runner --db warehouse.db run-queries
//!
//! Settings come from the environment (ENV, GCP_PROJECT_ID[_DEV|_PROD],
//! BQ_DATASET_NAME[_DEV|_PROD], BQ_LOCATION, AB_DATA_DIR, AB_SQL_DIR).
//!
//! The analysis SQL run by `run-queries` is not bundled and must be
//! supplied under <AB_SQL_DIR>/analysis/.

use abtest_core::{
    config::Settings,
    loader::{self, LoadOutcome},
    pipeline::{self, GenerationSummary},
    provision::{self, ScriptReport},
    queries,
    rng::SeededRng,
    simulator::EventSimulator,
    sink::{CsvEventSink, EventSink, TableEventSink},
    source::{CsvRecordSource, RecordSource, WarehouseRecordSource},
    store::SqliteWarehouse,
    warehouse::TableRef,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const EVENTS_FILE: &str = "synthetic_events.csv";
const EVENTS_TABLE: &str = "synthetic_events";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite warehouse root file (`:memory:` for a throwaway run).
    #[arg(long, default_value = "warehouse.db")]
    db: String,
    /// Print step summaries as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ensure the dataset exists and run every schema file.
    CreateTables {
        #[arg(long)]
        schema_dir: Option<PathBuf>,
    },
    /// Load the marketplace CSV files into their tables.
    Load {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Generate synthetic events from joined order records.
    ///
    /// Reading from the warehouse needs `customer_rollout` populated,
    /// which `run-queries` does from the supplied analysis SQL.
    Simulate {
        /// Read joined records from this CSV instead of the warehouse.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output CSV path (defaults to <data-dir>/synthetic_events.csv).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write to the synthetic_events table instead of a CSV file.
        #[arg(long)]
        to_table: bool,
        /// Fix the RNG seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the A/B analysis queries in order.
    ///
    /// The six analysis files are not bundled; put them in
    /// <sql-dir>/analysis/ or point --analysis-dir at them. Missing files
    /// are skipped.
    RunQueries {
        /// Directory holding rollout_assignment.sql .. segment_kpis.sql.
        #[arg(long)]
        analysis_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    log::debug!(
        "env={} project={} dataset={} location={}",
        settings.env,
        settings.project_id,
        settings.dataset,
        settings.location
    );

    let warehouse = SqliteWarehouse::open(&args.db)?;

    match args.command {
        Command::CreateTables { schema_dir } => {
            println!("Creating tables...");
            provision::ensure_dataset(&warehouse, &settings.dataset)?;
            let dir = schema_dir.unwrap_or_else(|| settings.schema_dir());
            let report = provision::apply_schema_dir(&warehouse, &dir, &settings.dataset)?;
            print_report(&report, args.json)?;
            println!("All tables created.");
        }
        Command::Load { data_dir } => {
            provision::ensure_dataset(&warehouse, &settings.dataset)?;
            let dir = data_dir.unwrap_or_else(|| settings.data_dir.clone());
            let summary = loader::load_all(&warehouse, &dir, &settings.dataset);
            if args.json {
                println!("{}", pipeline::summary_json(&summary)?);
            } else {
                println!("=== LOAD SUMMARY ===");
                for t in &summary.tables {
                    let status = match &t.outcome {
                        LoadOutcome::Loaded { rows } => format!("{rows} rows"),
                        LoadOutcome::FileNotFound => "file not found".into(),
                        LoadOutcome::TableNotFound => "table not found".into(),
                        LoadOutcome::Failed { error } => format!("failed: {error}"),
                    };
                    println!(
                        "  {:<36} -> {:<40} {status}",
                        t.file,
                        settings.qualified_table(&t.table)
                    );
                }
                println!("  total rows:     {}", summary.total_rows());
                println!("  failures:       {}", summary.failures());
            }
        }
        Command::Simulate {
            input,
            out,
            to_table,
            seed,
        } => {
            let rng = match seed {
                Some(s) => SeededRng::new(s),
                None => SeededRng::from_entropy(),
            };
            log::info!("simulation seed: {}", rng.seed);
            let mut simulator = EventSimulator::new(rng);

            let source: Box<dyn RecordSource + '_> = match input {
                Some(path) => Box::new(CsvRecordSource::new(path)),
                None => Box::new(WarehouseRecordSource::new(&warehouse, settings.dataset.clone())),
            };
            let mut sink: Box<dyn EventSink + '_> = if to_table {
                Box::new(TableEventSink::new(
                    &warehouse,
                    TableRef::new(settings.dataset.clone(), EVENTS_TABLE),
                ))
            } else {
                let path = out.unwrap_or_else(|| settings.data_dir.join(EVENTS_FILE));
                Box::new(CsvEventSink::new(path))
            };

            let summary = pipeline::generate_events(&*source, &mut simulator, &mut *sink)?;
            print_generation(&summary, &sink.describe(), args.json)?;
        }
        Command::RunQueries { analysis_dir } => {
            let dir = analysis_dir.unwrap_or_else(|| settings.analysis_dir());
            let report = queries::run_ab_queries(&warehouse, &dir, &settings.dataset);
            print_report(&report, args.json)?;
        }
    }

    Ok(())
}

fn print_report(report: &ScriptReport, json: bool) -> Result<()> {
    if json {
        println!("{}", pipeline::summary_json(report)?);
        return Ok(());
    }
    println!("=== SQL SUMMARY ===");
    println!("  succeeded:      {}", report.succeeded.len());
    println!("  skipped:        {}", report.skipped.len());
    println!("  failed:         {}", report.failed.len());
    for (file, error) in &report.failed {
        println!("    {file}: {error}");
    }
    Ok(())
}

fn print_generation(summary: &GenerationSummary, destination: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", pipeline::summary_json(summary)?);
        return Ok(());
    }
    println!("=== SIMULATION SUMMARY ===");
    println!("  records:         {}", summary.records);
    println!("  events:          {}", summary.events);
    println!("  order_placed:    {}", summary.order_placed);
    println!("  payment_success: {}", summary.payment_success);
    println!("  reviews:         {}", summary.reviews);
    println!("Synthetic event log saved to {destination}");
    Ok(())
}
