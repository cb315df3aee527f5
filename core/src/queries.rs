//! The A/B analysis query sequence.
//!
//! EXECUTION ORDER (fixed): each query builds on the tables the
//! previous ones produced. A missing file is skipped with a warning;
//! a failing query is logged and the sequence carries on.
//!
//! No analysis SQL ships with the workspace. Supply the six files under
//! `<AB_SQL_DIR>/analysis/` (or pass `--analysis-dir`). The first of
//! them, `rollout_assignment.sql`, is what fills `customer_rollout`;
//! until it has run, the order join behind `simulate` returns nothing.

use crate::{
    provision::{execute_sql_file, ScriptReport},
    warehouse::Warehouse,
};
use std::path::Path;

pub const AB_QUERY_SEQUENCE: [&str; 6] = [
    "rollout_assignment.sql",
    "pre_post_windowing.sql",
    "assign_ab_groups.sql",
    "orders_with_ab_groups.sql",
    "conversion_metrics.sql",
    "segment_kpis.sql",
];

pub fn run_ab_queries<W: Warehouse>(
    warehouse: &W,
    analysis_dir: &Path,
    dataset: &str,
) -> ScriptReport {
    let mut report = ScriptReport::default();
    for file in AB_QUERY_SEQUENCE {
        let full_path = analysis_dir.join(file);
        if !full_path.exists() {
            log::warn!("File not found: {}", full_path.display());
            report.skipped.push(file.to_string());
            continue;
        }
        log::info!("Executing: {file}");
        match execute_sql_file(warehouse, &full_path, dataset) {
            Ok(()) => {
                log::info!("Completed: {file}");
                report.succeeded.push(file.to_string());
            }
            Err(e) => {
                log::warn!("Error executing {file}: {e}");
                report.failed.push((file.to_string(), e.to_string()));
            }
        }
    }
    report
}
