//! Record sources feeding the simulator.
//!
//! A source returns the whole validated batch or an error; it never
//! hands back a partially validated list.

use crate::{
    error::{PipelineError, PipelineResult},
    record::{InputRecord, RawOrderRow},
    warehouse::Warehouse,
};
use std::io::Read;
use std::path::{Path, PathBuf};

pub trait RecordSource {
    fn fetch_records(&self) -> PipelineResult<Vec<InputRecord>>;
}

/// Validate every raw row, failing on the first malformed one.
pub fn validate_rows(rows: Vec<RawOrderRow>) -> PipelineResult<Vec<InputRecord>> {
    rows.into_iter().map(InputRecord::try_from_raw).collect()
}

/// Reads the order/rollout/payment/review join from a warehouse dataset.
pub struct WarehouseRecordSource<'a, W: Warehouse> {
    warehouse: &'a W,
    dataset: String,
}

impl<'a, W: Warehouse> WarehouseRecordSource<'a, W> {
    pub fn new(warehouse: &'a W, dataset: impl Into<String>) -> Self {
        Self {
            warehouse,
            dataset: dataset.into(),
        }
    }
}

impl<W: Warehouse> RecordSource for WarehouseRecordSource<'_, W> {
    fn fetch_records(&self) -> PipelineResult<Vec<InputRecord>> {
        let rows = self.warehouse.fetch_order_rows(&self.dataset)?;
        log::info!("record source: {} rows from dataset {}", rows.len(), self.dataset);
        validate_rows(rows)
    }
}

/// Reads an already-joined CSV export with a header row naming the
/// RawOrderRow columns. Extra columns are ignored.
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse joined rows from any reader.
    pub fn read_rows<R: Read>(reader: R) -> PipelineResult<Vec<RawOrderRow>> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for res in rdr.deserialize() {
            let row: RawOrderRow = res?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch_records(&self) -> PipelineResult<Vec<InputRecord>> {
        let file = std::fs::File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound {
                path: self.path.display().to_string(),
            },
            _ => e.into(),
        })?;
        let rows = Self::read_rows(file)?;
        log::info!("record source: {} rows from {}", rows.len(), self.path.display());
        validate_rows(rows)
    }
}
