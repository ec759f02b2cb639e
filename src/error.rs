// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TidemarkError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Malformed XML in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Resource identity conflict for '{name}': registered as {existing}, re-registered as {incoming}"
    )]
    ResourceConflict {
        name: String,
        existing: String,
        incoming: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TidemarkError>;

// Allow `?` on std::io::Error by converting to TidemarkError::Io with unknown path.
impl From<std::io::Error> for TidemarkError {
    fn from(source: std::io::Error) -> Self {
        TidemarkError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for TidemarkError {
    fn from(e: walkdir::Error) -> Self {
        TidemarkError::Other(e.to_string())
    }
}
