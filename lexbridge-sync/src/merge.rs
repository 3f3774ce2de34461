use std::fs;
use std::path::Path;

use lexbridge_merge::{MergeEngine, MergeEventListener};
use lexbridge_types::{parse_element, write_document, Element};
use tracing::info;

use crate::SyncResult;

/// Merges one changed domain file and writes the result to `path`.
///
/// `ours`, `theirs` and `common` are the file contents; an empty `common`
/// means the file was added on both sides.
pub fn merge_changed_file(
    engine: &MergeEngine<'_>,
    listener: &mut dyn MergeEventListener,
    path: &Path,
    ours: &str,
    theirs: &str,
    common: &str,
) -> SyncResult<Element> {
    let ours = parse_element(ours)?;
    let theirs = parse_element(theirs)?;
    let common = if common.trim().is_empty() {
        None
    } else {
        Some(parse_element(common)?)
    };

    let merged = engine.merge_file(listener, &ours, &theirs, common.as_ref())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, write_document(&merged))?;
    info!("Merged {}", path.display());
    Ok(merged)
}
