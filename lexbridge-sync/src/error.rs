//! Error types for the sync layer.

use std::path::PathBuf;

use lexbridge_forest::ForestError;
use lexbridge_merge::MergeError;
use lexbridge_schema::SchemaError;
use lexbridge_types::XmlError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur around a sync session.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another session holds the project.
    #[error("project is locked: {} exists", path.display())]
    Locked { path: PathBuf },

    /// Decomposition or recomposition failed.
    #[error("forest error: {0}")]
    Forest(#[from] ForestError),

    /// A changed file could not be merged.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The version control driver reported a failure.
    #[error("sync driver failed: {0}")]
    Driver(String),
}
