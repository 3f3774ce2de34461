//! The monolithic project document.
//!
//! ```xml
//! <languageproject version="7000037">
//!   <AdditionalFields> ... </AdditionalFields>
//!   <rt class="LangProject" guid="..."> ... </rt>
//!   <rt class="CmAgent" guid="..." ownerguid="..."> ... </rt>
//! </languageproject>
//! ```

use std::fs;
use std::path::Path;

use crate::{parse_element, write_document, Element, XmlResult};

/// Tag of a flat object record.
pub const RECORD_TAG: &str = "rt";

/// Tag of the optional custom property declaration block.
pub const CUSTOM_FIELDS_TAG: &str = "AdditionalFields";

/// A whole project held as one element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Root element, attributes only.
    pub root: Element,
    /// Custom property declarations, when the project has any.
    pub custom_fields: Option<Element>,
    /// Flat object records in document order.
    pub records: Vec<Element>,
}

impl Document {
    /// Creates an empty document with the given root tag.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: Element::new(root_name),
            custom_fields: None,
            records: Vec::new(),
        }
    }

    /// Splits a parsed root element into header and records.
    ///
    /// Children other than records and the custom field block are ignored.
    pub fn from_element(root: Element) -> Self {
        let head = root.emptied();
        let mut custom_fields = None;
        let mut records = Vec::new();
        for child in root.into_elements() {
            if child.name == CUSTOM_FIELDS_TAG && custom_fields.is_none() {
                custom_fields = Some(child);
            } else if child.name == RECORD_TAG {
                records.push(child);
            }
        }
        Self {
            root: head,
            custom_fields,
            records,
        }
    }

    /// Parses a document from XML text.
    pub fn parse(xml: &str) -> XmlResult<Self> {
        parse_element(xml).map(Self::from_element)
    }

    /// Reads a document from disk.
    pub fn read(path: &Path) -> XmlResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Reassembles the single root element.
    pub fn to_element(&self) -> Element {
        let mut root = self.root.emptied();
        if let Some(custom) = &self.custom_fields {
            root = root.with_child(custom.clone());
        }
        for record in &self.records {
            root = root.with_child(record.clone());
        }
        root
    }

    /// Serializes the document, declaration included.
    pub fn to_xml(&self) -> String {
        write_document(&self.to_element())
    }

    /// Writes the document to disk.
    pub fn write(&self, path: &Path) -> XmlResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_xml())?;
        Ok(())
    }
}
