//! SQLite-backed warehouse.
//!
//! RULE: Only the store talks to the database.
//! Provisioning, loading and simulation call Warehouse methods; they
//! never execute SQL directly except through execute_script().
//!
//! A dataset is an attached database: `ATTACH '<file>' AS <dataset>`.
//! For a file-backed warehouse at `warehouse.db`, dataset `sales`
//! lives in `warehouse.sales.db` beside it. In-memory warehouses attach
//! in-memory datasets.

use crate::{
    error::{PipelineError, PipelineResult},
    warehouse::TableRef,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

mod load;
mod orders;

pub struct SqliteWarehouse {
    conn: Connection,
    path: Option<PathBuf>, // None for :memory:
}

impl SqliteWarehouse {
    /// Open (or create) the warehouse root database at `path`.
    /// `:memory:` opens an in-memory warehouse.
    pub fn open(path: &str) -> PipelineResult<Self> {
        if path == ":memory:" {
            return Self::in_memory();
        }
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(PathBuf::from(path)),
        })
    }

    /// Open an in-memory warehouse (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    fn dataset_file(&self, dataset: &str) -> Option<PathBuf> {
        self.path.as_ref().map(|root| dataset_path(root, dataset))
    }

    fn is_attached(&self, dataset: &str) -> PipelineResult<bool> {
        let mut stmt = self.conn.prepare("PRAGMA database_list")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.iter().any(|n| n == dataset))
    }

    fn attach(&self, dataset: &str) -> PipelineResult<()> {
        let target = match self.dataset_file(dataset) {
            Some(p) => p.to_string_lossy().into_owned(),
            None => ":memory:".to_string(),
        };
        self.conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", quote_ident(dataset)?),
            params![target],
        )?;
        log::debug!("attached dataset {dataset} from {target}");
        Ok(())
    }

    /// Make sure `dataset` is attached, attaching an existing file if needed.
    /// Fails with DatasetNotFound when there is nothing to attach.
    pub(crate) fn require_dataset(&self, dataset: &str) -> PipelineResult<()> {
        if self.is_attached(dataset)? {
            return Ok(());
        }
        match self.dataset_file(dataset) {
            Some(file) if file.exists() => self.attach(dataset),
            _ => Err(PipelineError::DatasetNotFound {
                name: dataset.to_string(),
            }),
        }
    }

    /// Column names of `table`, in definition order.
    pub(crate) fn table_columns(&self, table: &TableRef) -> PipelineResult<Vec<String>> {
        self.require_dataset(&table.dataset)?;
        let sql = format!(
            "PRAGMA {}.table_info({})",
            quote_ident(&table.dataset)?,
            quote_ident(&table.table)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            return Err(PipelineError::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    /// Number of rows in `table`. Used by the CLI summary and tests.
    pub fn row_count(&self, table: &TableRef) -> PipelineResult<i64> {
        self.table_columns(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", qualified(table)?);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Read one column as text, in rowid order. Handy for inspecting
    /// loads and analysis outputs.
    pub fn column_values(
        &self,
        table: &TableRef,
        column: &str,
    ) -> PipelineResult<Vec<Option<String>>> {
        self.table_columns(table)?;
        let sql = format!(
            "SELECT CAST({} AS TEXT) FROM {} ORDER BY rowid",
            quote_ident(column)?,
            qualified(table)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

impl crate::warehouse::Warehouse for SqliteWarehouse {
    fn dataset_exists(&self, dataset: &str) -> PipelineResult<bool> {
        match self.require_dataset(dataset) {
            Ok(()) => Ok(true),
            Err(PipelineError::DatasetNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_dataset(&self, dataset: &str) -> PipelineResult<()> {
        if self.is_attached(dataset)? {
            return Ok(());
        }
        self.attach(dataset)
    }

    fn table_exists(&self, table: &TableRef) -> PipelineResult<bool> {
        match self.table_columns(table) {
            Ok(_) => Ok(true),
            Err(PipelineError::TableNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn execute_script(&self, sql: &str) -> PipelineResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn load_csv(
        &self,
        table: &TableRef,
        source: &mut dyn std::io::Read,
        job: &crate::warehouse::LoadJobConfig,
    ) -> PipelineResult<u64> {
        self.load_csv_rows(table, source, job)
    }

    fn fetch_order_rows(&self, dataset: &str) -> PipelineResult<Vec<crate::record::RawOrderRow>> {
        self.joined_order_rows(dataset)
    }

    fn replace_events(
        &self,
        table: &TableRef,
        events: &[crate::event::SimulatedEvent],
    ) -> PipelineResult<u64> {
        self.write_events(table, events)
    }
}

/// `warehouse.db` + `sales` → `warehouse.sales.db`.
fn dataset_path(root: &Path, dataset: &str) -> PathBuf {
    let stem = root
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "warehouse".into());
    root.with_file_name(format!("{stem}.{dataset}.db"))
}

/// Quote a dataset, table or column name. Only plain identifiers are
/// accepted so names can never smuggle SQL.
pub(crate) fn quote_ident(name: &str) -> PipelineResult<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(anyhow::anyhow!("invalid identifier {name:?}").into());
    }
    Ok(format!("\"{name}\""))
}

pub(crate) fn qualified(table: &TableRef) -> PipelineResult<String> {
    Ok(format!(
        "{}.{}",
        quote_ident(&table.dataset)?,
        quote_ident(&table.table)?
    ))
}
