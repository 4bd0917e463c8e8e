use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("schema '{reference}' not found in '{dir}': {source}")]
    SchemaNotFound {
        reference: String,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed input batch '{path}': {message}")]
    MalformedInput { path: PathBuf, message: String },

    #[error("failed to write output '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
