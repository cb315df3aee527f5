//! Event sinks: where a finished batch of simulated events goes.
//!
//! RULE: A sink receives the whole batch exactly once. A failed write
//! leaves no partial output behind.

use crate::{
    error::PipelineResult,
    event::SimulatedEvent,
    warehouse::{TableRef, Warehouse},
};
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait EventSink {
    /// Persist the full batch. Returns the number of events written.
    fn write_batch(&mut self, events: &[SimulatedEvent]) -> PipelineResult<u64>;

    /// Human-readable destination for log lines.
    fn describe(&self) -> String;
}

/// Writes a CSV with a header row in SimulatedEvent::COLUMNS order.
/// The file is written beside the target and renamed into place.
pub struct CsvEventSink {
    path: PathBuf,
}

impl CsvEventSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize events to any writer, header included.
    pub fn write_to<W: Write>(writer: W, events: &[SimulatedEvent]) -> PipelineResult<()> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(SimulatedEvent::COLUMNS)?;
        for event in events {
            wtr.serialize(event)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

impl EventSink for CsvEventSink {
    fn write_batch(&mut self, events: &[SimulatedEvent]) -> PipelineResult<u64> {
        let staging = self.staging_path();
        let written = std::fs::File::create(&staging)
            .map_err(Into::into)
            .and_then(|file| Self::write_to(std::io::BufWriter::new(file), events));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&staging, &self.path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(events.len() as u64)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Replaces a warehouse table with the batch.
pub struct TableEventSink<'a, W: Warehouse> {
    warehouse: &'a W,
    table: TableRef,
}

impl<'a, W: Warehouse> TableEventSink<'a, W> {
    pub fn new(warehouse: &'a W, table: TableRef) -> Self {
        Self { warehouse, table }
    }
}

impl<W: Warehouse> EventSink for TableEventSink<'_, W> {
    fn write_batch(&mut self, events: &[SimulatedEvent]) -> PipelineResult<u64> {
        self.warehouse.replace_events(&self.table, events)
    }

    fn describe(&self) -> String {
        self.table.to_string()
    }
}
