use super::{qualified, quote_ident, SqliteWarehouse};
use crate::{
    error::PipelineResult,
    event::SimulatedEvent,
    record::RawOrderRow,
    types::TIMESTAMP_FORMAT,
    warehouse::TableRef,
};
use rusqlite::{params, types::ValueRef};

impl SqliteWarehouse {
    // ── Record source ─────────────────────────────────────────────

    /// Orders joined to their rollout arm, with payment and review
    /// attached when present. Orders without a rollout row are dropped
    /// by the inner join.
    pub(crate) fn joined_order_rows(&self, dataset: &str) -> PipelineResult<Vec<RawOrderRow>> {
        self.require_dataset(dataset)?;
        let t = |name: &str| qualified(&TableRef::new(dataset, name));
        let sql = format!(
            "SELECT o.order_id, o.customer_id, o.order_purchase_timestamp,
                    p.payment_value, r.review_score, cr.ab_group, cr.feature_exposure_date
             FROM {orders} o
             JOIN {rollout} cr ON o.customer_id = cr.customer_id
             LEFT JOIN {payments} p ON o.order_id = p.order_id
             LEFT JOIN {reviews} r ON o.order_id = r.order_id
             ORDER BY o.rowid",
            orders = t("orders")?,
            rollout = t("customer_rollout")?,
            payments = t("payments")?,
            reviews = t("reviews")?,
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawOrderRow {
                    order_id: as_text(row.get_ref(0)?),
                    customer_id: as_text(row.get_ref(1)?),
                    order_purchase_timestamp: as_text(row.get_ref(2)?),
                    payment_value: as_f64(row.get_ref(3)?),
                    review_score: as_text(row.get_ref(4)?),
                    ab_group: as_text(row.get_ref(5)?),
                    feature_exposure_date: as_text(row.get_ref(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("fetched {} joined order rows from {dataset}", rows.len());
        Ok(rows)
    }

    // ── Event sink ────────────────────────────────────────────────

    pub(crate) fn write_events(
        &self,
        table: &TableRef,
        events: &[SimulatedEvent],
    ) -> PipelineResult<u64> {
        self.require_dataset(&table.dataset)?;
        let target = qualified(table)?;
        let columns = SimulatedEvent::COLUMNS
            .iter()
            .map(|c| quote_ident(c))
            .collect::<PipelineResult<Vec<_>>>()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {target} ({});",
            columns
                .iter()
                .map(|c| format!("{c} TEXT NOT NULL"))
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
        tx.execute(&format!("DELETE FROM {target}"), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {target} ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                columns.join(", ")
            ))?;
            for e in events {
                stmt.execute(params![
                    e.customer_id,
                    e.order_id,
                    e.event_type.as_str(),
                    e.event_timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    e.ab_group,
                ])?;
            }
        }
        tx.commit()?;
        Ok(events.len() as u64)
    }
}

fn as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

fn as_f64(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t).ok()?.trim().parse().ok(),
    }
}
