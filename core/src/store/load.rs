use super::{qualified, quote_ident, SqliteWarehouse};
use crate::{
    error::PipelineResult,
    warehouse::{LoadJobConfig, TableRef, WriteDisposition},
};
use std::io::Read;

impl SqliteWarehouse {
    // ── CSV load jobs ─────────────────────────────────────────────

    /// Load CSV records into an existing table, positionally.
    /// Empty fields become NULL. Runs in one transaction: a bad record
    /// leaves the table exactly as it was.
    pub(crate) fn load_csv_rows(
        &self,
        table: &TableRef,
        source: &mut dyn Read,
        job: &LoadJobConfig,
    ) -> PipelineResult<u64> {
        let columns = self.table_columns(table)?;
        let target = qualified(table)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(job.field_delimiter)
            .from_reader(source);

        let tx = self.conn.unchecked_transaction()?;
        if job.write_disposition == WriteDisposition::Truncate {
            tx.execute(&format!("DELETE FROM {target}"), [])?;
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<PipelineResult<Vec<_>>>()?
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut rows = 0u64;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {target} ({column_list}) VALUES ({placeholders})"
            ))?;
            for (i, record) in reader.records().enumerate() {
                let record = record?;
                if i < job.skip_leading_rows {
                    continue;
                }
                if record.len() != columns.len() {
                    return Err(anyhow::anyhow!(
                        "{table}: line {} has {} fields, table has {} columns",
                        i + 1,
                        record.len(),
                        columns.len()
                    )
                    .into());
                }
                let values = record
                    .iter()
                    .map(|field| (!field.is_empty()).then_some(field));
                stmt.execute(rusqlite::params_from_iter(values))?;
                rows += 1;
            }
        }
        tx.commit()?;

        log::debug!("loaded {rows} rows into {table}");
        Ok(rows)
    }
}
