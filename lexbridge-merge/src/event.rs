//! Change and conflict records reported while merging.

use serde::{Deserialize, Serialize};

/// One of the two edited versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ours,
    Theirs,
}

/// How conflicts are settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep our version (default).
    #[default]
    OursWins,
    /// Keep their version.
    TheirsWins,
}

impl ConflictPolicy {
    /// Side whose version is kept when both changed the same thing.
    #[must_use]
    pub const fn winner(self) -> Side {
        match self {
            Self::OursWins => Side::Ours,
            Self::TheirsWins => Side::Theirs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Edited,
    Reordered,
}

/// A change taken from one side without conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeChange {
    pub kind: ChangeKind,
    pub side: Side,
    /// Location, e.g. `LangProject[guid]/AnalyzingAgents/CmAgent[guid]`.
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both sides changed the same value differently.
    BothEdited,
    /// Both sides added the same thing with different content.
    BothAdded,
    /// One side removed what the other edited; the edited version is kept.
    RemovedVsEdited,
    /// Both sides reordered a sequence differently.
    AmbiguousReorder,
}

/// A conflict and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub kind: ConflictKind,
    pub path: String,
    pub ours: Option<String>,
    pub theirs: Option<String>,
    pub ancestor: Option<String>,
    /// Side whose version ended up in the result.
    pub winner: Side,
}
