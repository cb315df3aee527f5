//! Run settings, resolved once at startup and passed by reference.
//!
//! RULE: Nothing below the binary reads the environment. Components
//! receive a &Settings built by from_env() (or default_test() in tests).

use crate::error::{PipelineError, PipelineResult};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_LOCATION: &str = "US";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_SQL_DIR: &str = "./sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn parse(raw: &str) -> PipelineResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(PipelineError::UnknownEnvironment(other.to_string())),
        }
    }

    /// Suffix used by environment-specific keys (GCP_PROJECT_ID_DEV, ...).
    fn key_suffix(&self) -> &'static str {
        match self {
            Self::Dev => "DEV",
            Self::Prod => "PROD",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub env: Environment,
    pub project_id: String,
    pub dataset: String,
    pub location: String,
    /// Directory holding the source CSV files and simulation output.
    pub data_dir: PathBuf,
    /// Directory holding `schema/` DDL and `analysis/` query files.
    pub sql_dir: PathBuf,
}

impl Settings {
    /// Resolve from process environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    ///
    /// Environment-specific keys win over generic ones:
    /// `GCP_PROJECT_ID_<ENV>` then `GCP_PROJECT_ID`, and likewise for
    /// `BQ_DATASET_NAME`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = Environment::parse(&get("ENV").unwrap_or_default())?;
        let suffix = env.key_suffix();

        let project_id = get(&format!("GCP_PROJECT_ID_{suffix}"))
            .or_else(|| get("GCP_PROJECT_ID"))
            .ok_or_else(|| PipelineError::MissingSetting {
                key: "GCP_PROJECT_ID",
                env: env.to_string(),
            })?;
        let dataset = get(&format!("BQ_DATASET_NAME_{suffix}"))
            .or_else(|| get("BQ_DATASET_NAME"))
            .ok_or_else(|| PipelineError::MissingSetting {
                key: "BQ_DATASET_NAME",
                env: env.to_string(),
            })?;

        Ok(Self {
            env,
            project_id,
            dataset,
            location: get("BQ_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.into()),
            data_dir: get("AB_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()).into(),
            sql_dir: get("AB_SQL_DIR").unwrap_or_else(|| DEFAULT_SQL_DIR.into()).into(),
        })
    }

    /// Settings with hardcoded values for use in tests.
    pub fn default_test() -> Self {
        Self {
            env: Environment::Dev,
            project_id: "ab-testing-analytics".into(),
            dataset: "marketplace_ab_test".into(),
            location: DEFAULT_LOCATION.into(),
            data_dir: DEFAULT_DATA_DIR.into(),
            sql_dir: DEFAULT_SQL_DIR.into(),
        }
    }

    pub fn schema_dir(&self) -> PathBuf {
        self.sql_dir.join("schema")
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.sql_dir.join("analysis")
    }

    /// `project.dataset.table`, for log lines and summaries.
    pub fn qualified_table(&self, table: &str) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset, table)
    }
}
