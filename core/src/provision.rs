//! Dataset and table provisioning from schema files.
//!
//! Every `*.sql` file in the schema directory runs in lexical order.
//! A failing file is logged and counted; the rest still run.
//! `{dataset}` inside a file is replaced with the configured dataset.

use crate::{
    error::{PipelineError, PipelineResult},
    warehouse::Warehouse,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DATASET_PLACEHOLDER: &str = "{dataset}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    AlreadyExists,
    Created,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<String>,
}

impl ScriptReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn ensure_dataset<W: Warehouse>(warehouse: &W, dataset: &str) -> PipelineResult<DatasetStatus> {
    if warehouse.dataset_exists(dataset)? {
        log::info!("Dataset already exists: {dataset}");
        return Ok(DatasetStatus::AlreadyExists);
    }
    warehouse.create_dataset(dataset)?;
    log::info!("Created dataset: {dataset}");
    Ok(DatasetStatus::Created)
}

/// `*.sql` files in `dir`, sorted by file name.
pub fn sql_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::FileNotFound {
            path: dir.display().to_string(),
        },
        _ => e.into(),
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn render_sql(sql: &str, dataset: &str) -> String {
    sql.replace(DATASET_PLACEHOLDER, dataset)
}

/// Run one SQL file against the warehouse.
pub fn execute_sql_file<W: Warehouse>(
    warehouse: &W,
    path: &Path,
    dataset: &str,
) -> PipelineResult<()> {
    let sql = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => e.into(),
    })?;
    warehouse.execute_script(&render_sql(&sql, dataset))
}

pub fn apply_schema_dir<W: Warehouse>(
    warehouse: &W,
    schema_dir: &Path,
    dataset: &str,
) -> PipelineResult<ScriptReport> {
    let mut report = ScriptReport::default();
    for path in sql_files(schema_dir)? {
        let name = file_label(&path);
        log::info!("Executing: {name}");
        match execute_sql_file(warehouse, &path, dataset) {
            Ok(()) => {
                log::info!("Success: {name}");
                report.succeeded.push(name);
            }
            Err(e) => {
                log::warn!("Failed: {name} with error: {e}");
                report.failed.push((name, e.to_string()));
            }
        }
    }
    Ok(report)
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
