use std::collections::BTreeMap;

use lexbridge_types::Guid;

use crate::{ForestError, ForestResult};

/// Identifier → class name for every object of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    classes: BTreeMap<Guid, String>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object. A repeated identifier is an error.
    pub fn insert(&mut self, guid: Guid, class: impl Into<String>) -> ForestResult<()> {
        if self.classes.contains_key(&guid) {
            return Err(ForestError::DuplicateIdentifier(guid.to_string()));
        }
        self.classes.insert(guid, class.into());
        Ok(())
    }

    pub fn class_of(&self, guid: &Guid) -> Option<&str> {
        self.classes.get(guid).map(String::as_str)
    }

    pub fn contains(&self, guid: &Guid) -> bool {
        self.classes.contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Identifiers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Guid, &str)> {
        self.classes.iter().map(|(g, c)| (g, c.as_str()))
    }
}
