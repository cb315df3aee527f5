use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record for order '{order_id}' is missing required field '{field}'")]
    MissingField { order_id: String, field: &'static str },

    #[error("Invalid timestamp '{value}' on order '{order_id}'")]
    InvalidTimestamp { order_id: String, value: String },

    #[error("Dataset '{name}' not found")]
    DatasetNotFound { name: String },

    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("{key} not set for environment: {env}")]
    MissingSetting { key: &'static str, env: String },

    #[error("Unknown environment '{0}' (expected dev or prod)")]
    UnknownEnvironment(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
