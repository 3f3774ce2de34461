//! Object identifiers.
//!
//! Every object in a project carries a 128-bit identifier. The textual form
//! is compared case-insensitively; lexbridge always writes it lower-cased.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::XmlError;

/// Unique identifier of an object in the project graph.
///
/// Ordering matches case-insensitive lexicographic ordering of the textual
/// form, because the hyphenated form lists the bytes in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(Uuid);

impl Guid {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses an identifier, accepting any letter case.
    pub fn parse(s: &str) -> Result<Self, XmlError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| XmlError::InvalidGuid(s.to_string()))
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // uuid renders lower-case hyphenated
        write!(f, "{}", self.0)
    }
}

impl FromStr for Guid {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Sort key for a textual identifier that may not be well formed.
pub fn guid_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
