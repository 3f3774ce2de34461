//! Reading and writing file forests on disk.

use std::fs;
use std::path::Path;

use lexbridge_schema::SchemaRegistry;
use lexbridge_types::{parse_element, write_document, Document};
use tracing::{debug, info};

use crate::{join, split, Decomposition, DomainLayout, FileForest, ForestResult};

/// Writes every file of a forest under `dir`, creating directories.
pub fn write_forest(dir: &Path, forest: &FileForest) -> ForestResult<()> {
    for (relative, root) in forest {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, write_document(root))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Reads the files a layout names; absent files are left out.
pub fn read_forest(dir: &Path, layout: &DomainLayout, project_name: &str) -> ForestResult<FileForest> {
    let mut forest = FileForest::new();
    for relative in layout.managed_paths(project_name) {
        let path = dir.join(&relative);
        if !path.is_file() {
            debug!("{} not present", path.display());
            continue;
        }
        let text = fs::read_to_string(&path)?;
        forest.insert(relative, parse_element(&text)?);
        info!("Read {}", path.display());
    }
    Ok(forest)
}

/// Deletes the files a layout manages under `dir`. Returns how many existed.
pub fn remove_managed(dir: &Path, layout: &DomainLayout, project_name: &str) -> ForestResult<usize> {
    let mut removed = 0;
    for relative in layout.managed_paths(project_name) {
        let path = dir.join(relative);
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Reads a monolithic file and replaces the forest under `forest_dir`.
///
/// Files from a previous split are removed first so a domain that has
/// become empty leaves nothing behind.
pub fn decompose_file(
    source: &Path,
    forest_dir: &Path,
    registry: &SchemaRegistry,
    layout: &DomainLayout,
    project_name: &str,
) -> ForestResult<Decomposition> {
    let document = Document::read(source)?;
    let decomposition = split(&document, registry, layout, project_name)?;
    let stale = remove_managed(forest_dir, layout, project_name)?;
    debug!("Removed {} previous files", stale);
    write_forest(forest_dir, &decomposition.forest)?;
    Ok(decomposition)
}

/// Reads the forest under `forest_dir` and writes the monolithic file.
pub fn recompose_file(
    forest_dir: &Path,
    dest: &Path,
    registry: &SchemaRegistry,
    layout: &DomainLayout,
    project_name: &str,
) -> ForestResult<Document> {
    let forest = read_forest(forest_dir, layout, project_name)?;
    let document = join(&forest, registry, layout, project_name)?;
    document.write(dest)?;
    info!("Wrote {}", dest.display());
    Ok(document)
}
