//! Three-way merge for lexbridge domain files.
//!
//! Two people edit copies of the same file forest; the version control
//! system hands each changed file to [`MergeEngine`] with the common
//! ancestor. Every unit (an object record, or the `header` block of a file)
//! passes through:
//!
//! 1. **PreMerge**: all three versions are canonicalized and competing
//!    `DateModified` stamps are settled on the later time.
//! 2. **StructuralMerge**: properties are merged by category. Scalars and
//!    atomic references as a whole, writing-system alternatives per `ws`,
//!    collections and sequences per member identifier (sequences also
//!    reconcile order), owned objects recursively.
//! 3. **Done**: the result is canonicalized again.
//!
//! Merging never fails on a conflict. Each conflict is reported to a
//! [`MergeEventListener`] and settled by the [`ConflictPolicy`]; a removal
//! racing an edit always keeps the edit.

mod engine;
mod event;
mod listener;
mod premerge;
mod structural;

pub use engine::{MergeEngine, MergeStage};
pub use event::{
    ChangeKind, ConflictKind, ConflictPolicy, MergeChange, MergeConflict, Side,
};
pub use listener::{CollectingListener, MergeEventListener, TracingListener};
pub use premerge::DATE_MODIFIED;

use lexbridge_canon::CanonError;
use lexbridge_schema::SchemaError;
use lexbridge_types::XmlError;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Failures that stop a merge. Conflicts are never errors.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("canonicalization error: {0}")]
    Canon(#[from] CanonError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The two versions are not the same unit.
    #[error("cannot merge {ours} with {theirs}")]
    MismatchedUnits { ours: String, theirs: String },
}
