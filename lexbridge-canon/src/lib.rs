//! Canonical ordering for lexbridge.
//!
//! Rewrites object records so that two independently built copies of the
//! same content serialize to the same bytes:
//!
//! - records ordered by identifier (case-insensitive)
//! - custom property declarations ordered by class + name
//! - properties ordered by name; `Custom` properties by their `name`
//! - collection children ordered by identifier, duplicates collapsed
//! - sequence children left in authored order
//! - writing-system alternatives ordered by `ws`
//! - attributes sorted by name on elements carrying two or more
//!
//! Rules apply depth-first, children before parents. Every operation is
//! idempotent.

mod attributes;
mod canonicalizer;
mod custom_fields;

pub use attributes::{normalize_identifiers, sort_attributes};
pub use canonicalizer::{
    class_name, identifier_key, objsur, property_key, Canonicalizer, GUID_ATTR, OBJSUR_TAG,
    OWNER_ATTR,
};
pub use custom_fields::{canonicalize_custom_fields, KeyAttribute, KEY_ATTR};

use lexbridge_schema::SchemaError;

/// Result type for canonicalization.
pub type CanonResult<T> = Result<T, CanonError>;

/// Errors raised while canonicalizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },
}
