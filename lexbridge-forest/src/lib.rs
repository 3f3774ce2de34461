//! File forest engines for lexbridge.
//!
//! A project is held as one monolithic XML document (flat `<rt>` records
//! linked by `<objsur>` markers). For version control it is split into a
//! tree of smaller domain files, where each object is written nested inside
//! its owner:
//!
//! ```text
//! <project>/
//!   General/<project>.langproj              root objects
//!   General/<project>.CustomProperties      custom field declarations
//!   Linguistics/MorphologyAndSyntax/...     one file per boundary
//!   Anthropology/...
//! ```
//!
//! [`split`] and [`join`] are pure; the [`io`] functions put them on disk.
//! `join(split(doc))` equals the canonical form of `doc`.

mod error;
mod index;
pub mod io;
mod join;
mod layout;
mod split;

use std::collections::BTreeMap;
use std::path::PathBuf;

use lexbridge_types::Element;

pub use error::{ForestError, ForestResult};
pub use index::IdentifierIndex;
pub use io::{decompose_file, read_forest, recompose_file, remove_managed, write_forest};
pub use join::join;
pub use layout::{Boundary, DomainLayout, GENERAL_DOMAIN, HEADER_TAG};
pub use split::{split, Decomposition};

/// Domain files by path relative to the forest root.
pub type FileForest = BTreeMap<PathBuf, Element>;
