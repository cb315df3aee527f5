//! Bulk CSV load of the marketplace source files.
//!
//! Each file is loaded independently with a truncating load job.
//! A missing file, a missing table or a bad file is logged and the
//! next file is attempted.

use crate::{
    error::{PipelineError, PipelineResult},
    warehouse::{LoadJobConfig, TableRef, Warehouse},
};
use serde::Serialize;
use std::path::Path;

/// Source file → destination table. Loaded in this order.
pub const CSV_TO_TABLE: [(&str, &str); 8] = [
    ("olist_orders_dataset.csv", "orders"),
    ("olist_order_items_dataset.csv", "order_items"),
    ("olist_order_payments_dataset.csv", "payments"),
    ("olist_order_reviews_dataset.csv", "reviews"),
    ("olist_customers_dataset.csv", "customers"),
    ("olist_products_dataset.csv", "products"),
    ("olist_sellers_dataset.csv", "sellers"),
    ("olist_geolocation_dataset.csv", "geolocation"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { rows: u64 },
    FileNotFound,
    TableNotFound,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TableLoad {
    pub file: String,
    pub table: String,
    pub outcome: LoadOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub tables: Vec<TableLoad>,
}

impl LoadSummary {
    pub fn total_rows(&self) -> u64 {
        self.tables
            .iter()
            .map(|t| match t.outcome {
                LoadOutcome::Loaded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| !matches!(t.outcome, LoadOutcome::Loaded { .. }))
            .count()
    }
}

/// Load one local CSV file into an existing table.
pub fn load_csv_to_table<W: Warehouse>(
    warehouse: &W,
    file_path: &Path,
    table: &TableRef,
    job: &LoadJobConfig,
) -> PipelineResult<u64> {
    let mut file = std::fs::File::open(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::FileNotFound {
            path: file_path.display().to_string(),
        },
        _ => e.into(),
    })?;
    if !warehouse.table_exists(table)? {
        return Err(PipelineError::TableNotFound {
            table: table.to_string(),
        });
    }
    warehouse.load_csv(table, &mut file, job)
}

/// Load every mapped file from `data_dir` into `dataset`.
pub fn load_all<W: Warehouse>(warehouse: &W, data_dir: &Path, dataset: &str) -> LoadSummary {
    let job = LoadJobConfig::default();
    let mut summary = LoadSummary::default();

    for (file, table_name) in CSV_TO_TABLE {
        let file_path = data_dir.join(file);
        let table = TableRef::new(dataset, table_name);
        log::info!("Loading data from {} -> {table}", file_path.display());

        let outcome = match load_csv_to_table(warehouse, &file_path, &table, &job) {
            Ok(rows) => {
                log::info!("Loaded {rows} rows into `{table}`");
                LoadOutcome::Loaded { rows }
            }
            Err(PipelineError::FileNotFound { path }) => {
                log::warn!("File not found: {path}");
                LoadOutcome::FileNotFound
            }
            Err(PipelineError::TableNotFound { table })
            | Err(PipelineError::DatasetNotFound { name: table }) => {
                log::warn!("Table not found: {table}");
                LoadOutcome::TableNotFound
            }
            Err(e) => {
                log::warn!("Failed to load {table}: {e}");
                LoadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        summary.tables.push(TableLoad {
            file: file.to_string(),
            table: table_name.to_string(),
            outcome,
        });
    }
    summary
}
