//! Core type definitions for lexbridge.
//!
//! This crate defines the fundamental types every other lexbridge crate
//! builds on:
//! - Object identifiers ([`Guid`]), compared case-insensitively
//! - The immutable XML element tree ([`Element`], [`Node`])
//! - The monolithic project document ([`Document`])
//! - XML reading and deterministic writing
//!
//! Schema knowledge (which properties own, which reference) lives in
//! `lexbridge-schema`, not here.

mod document;
mod element;
mod ids;
mod xml;

pub use document::{Document, CUSTOM_FIELDS_TAG, RECORD_TAG};
pub use element::{Element, Node};
pub use ids::{guid_key, Guid};
pub use xml::{parse_element, write_document, write_element, XML_DECLARATION};

/// Result type alias using the crate's error type.
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// Errors that can occur while reading or interpreting XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("xml parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("unexpected end of input inside <{0}>")]
    UnexpectedEof(String),

    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("invalid identifier: {0}")]
    InvalidGuid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
