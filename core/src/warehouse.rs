//! The warehouse client contract.
//!
//! RULE: Orchestration code talks to storage only through Warehouse.
//! The workspace ships a SQLite implementation (store::SqliteWarehouse);
//! a managed warehouse would be another implementor of the same trait.

use crate::{
    error::PipelineResult,
    event::SimulatedEvent,
    record::RawOrderRow,
};
use std::fmt;
use std::io::Read;

/// A table addressed as `dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    /// Replace the table's rows with the loaded rows.
    Truncate,
    /// Keep existing rows and add the loaded ones.
    Append,
}

/// How a CSV file is loaded into an existing table.
/// Columns are matched by position against the table definition;
/// no schema is inferred from the file.
#[derive(Debug, Clone)]
pub struct LoadJobConfig {
    pub skip_leading_rows: usize,
    pub field_delimiter: u8,
    pub write_disposition: WriteDisposition,
}

impl Default for LoadJobConfig {
    fn default() -> Self {
        Self {
            skip_leading_rows: 1,
            field_delimiter: b',',
            write_disposition: WriteDisposition::Truncate,
        }
    }
}

pub trait Warehouse {
    fn dataset_exists(&self, dataset: &str) -> PipelineResult<bool>;

    fn create_dataset(&self, dataset: &str) -> PipelineResult<()>;

    fn table_exists(&self, table: &TableRef) -> PipelineResult<bool>;

    /// Run one SQL script (one or more statements) to completion.
    fn execute_script(&self, sql: &str) -> PipelineResult<()>;

    /// Load CSV rows into an existing table. Returns the rows written.
    /// The load is all-or-nothing.
    fn load_csv(
        &self,
        table: &TableRef,
        source: &mut dyn Read,
        job: &LoadJobConfig,
    ) -> PipelineResult<u64>;

    /// The joined order/rollout/payment/review rows the simulator consumes.
    fn fetch_order_rows(&self, dataset: &str) -> PipelineResult<Vec<RawOrderRow>>;

    /// Replace `table` with `events` in one transaction, creating it if needed.
    fn replace_events(&self, table: &TableRef, events: &[SimulatedEvent]) -> PipelineResult<u64>;
}
