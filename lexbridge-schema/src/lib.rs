//! Schema registry for lexbridge.
//!
//! Describes every object class the engines understand:
//! - [`SchemaRegistry`]: read-only lookup of classes, built once per pass
//! - [`ClassInfo`]: a class and its properties, inherited ones included
//! - [`PropertyInfo`]: one property, its stored [`DataType`] and the
//!   [`PropertyCategory`] that drives ordering, splitting and merging
//! - [`CustomFieldDecl`]: a property declared by the project itself
//!
//! Components never hardcode per-class behaviour; they ask the registry
//! whether a property owns, references, or holds alternatives.

mod catalog;
mod custom;
mod schema;

pub use custom::{CustomFieldDecl, CUSTOM_FIELD_TAG, CUSTOM_PROPERTY_TAG};
pub use schema::{ClassDef, ClassInfo, DataType, PropertyCategory, PropertyInfo, SchemaRegistry};

/// Result type for schema lookups.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised by schema lookups and registry construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("unknown property {property} on class {class}")]
    UnknownProperty { class: String, property: String },

    #[error("unknown data type: {0}")]
    UnknownDataType(String),

    #[error("invalid custom field: {0}")]
    InvalidCustomField(String),
}
