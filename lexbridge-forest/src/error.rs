//! Error types for the forest engines.

use lexbridge_canon::CanonError;
use lexbridge_schema::SchemaError;
use lexbridge_types::XmlError;
use thiserror::Error;

/// Result type for forest operations.
pub type ForestResult<T> = Result<T, ForestError>;

/// Errors that abort a decomposition or recomposition pass.
#[derive(Debug, Error)]
pub enum ForestError {
    /// Class or property unknown to the registry.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Two objects share an identifier.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// A domain file exists but the object owning its contents does not.
    #[error("no {owner_class} object owns {file}")]
    MissingOwner { owner_class: String, file: String },

    /// Structural breakage: unreachable records, dangling markers, missing
    /// mandatory files.
    #[error("corrupt forest: {0}")]
    CorruptForest(String),

    /// A layout entry that does not describe an owning property.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Malformed XML or identifier.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Canonicalization failure.
    #[error("canonicalization error: {0}")]
    Canon(#[from] CanonError),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
