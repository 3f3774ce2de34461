//! One synchronization of a project with its shared repository.
//!
//! ```text
//! lock ─▶ decompose ─▶ driver.synchronize ─▶ recompose (if pulled) ─▶ unlock
//! ```
//!
//! A failing stage stops the stages after it; the lock marker is removed
//! either way.

use std::fs;
use std::path::Path;

use lexbridge_forest::{decompose_file, recompose_file, DomainLayout};
use lexbridge_merge::MergeEngine;
use lexbridge_schema::{CustomFieldDecl, SchemaRegistry};
use lexbridge_types::parse_element;
use tracing::{debug, info};

use crate::{BridgeConfig, LockMarker, SyncResult};

/// Result of a version control round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Whether the forest on disk now holds changes from others.
    pub pulled_changes: bool,
}

/// The external version control system.
///
/// Implementations commit the forest, exchange it with the shared
/// repository, and merge incoming changes (typically through
/// [`merge_changed_file`](crate::merge_changed_file)).
pub trait SyncDriver {
    fn synchronize(&mut self, forest_dir: &Path) -> SyncResult<SyncOutcome>;
}

/// What a completed session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub objects: usize,
    pub files: usize,
    pub pulled_changes: bool,
    pub recomposed: bool,
}

pub struct SyncSession {
    config: BridgeConfig,
    registry: SchemaRegistry,
}

impl SyncSession {
    /// Session over the built-in schema.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_registry(config, SchemaRegistry::builtin())
    }

    pub fn with_registry(config: BridgeConfig, registry: SchemaRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Runs lock, decompose, sync and recompose.
    pub fn run(&self, driver: &mut dyn SyncDriver) -> SyncResult<SessionReport> {
        let config = &self.config;
        config.validate()?;
        let _lock = LockMarker::acquire(&config.project_dir, &config.project_name)?;

        let project_file = config.project_file();
        let forest_dir = config.forest_path();
        let decomposition = decompose_file(
            &project_file,
            &forest_dir,
            &self.registry,
            &config.layout,
            &config.project_name,
        )?;
        info!(
            "Decomposed {} objects into {} files under {}",
            decomposition.index.len(),
            decomposition.forest.len(),
            forest_dir.display()
        );

        let outcome = driver.synchronize(&forest_dir)?;

        if outcome.pulled_changes {
            recompose_file(
                &forest_dir,
                &project_file,
                &self.registry,
                &config.layout,
                &config.project_name,
            )?;
        } else {
            debug!("Nothing pulled, {} left as is", project_file.display());
        }

        Ok(SessionReport {
            objects: decomposition.index.len(),
            files: decomposition.forest.len(),
            pulled_changes: outcome.pulled_changes,
            recomposed: outcome.pulled_changes,
        })
    }

    /// Registry extended with the custom fields declared in the forest,
    /// for merging its files.
    pub fn merge_registry(&self) -> SyncResult<SchemaRegistry> {
        project_registry(&self.registry, &self.config.forest_path(), &self.config.project_name)
    }

    /// A merge engine using the configured conflict policy.
    pub fn merge_engine<'a>(&self, registry: &'a SchemaRegistry) -> MergeEngine<'a> {
        MergeEngine::new(registry).with_policy(self.config.conflict_policy)
    }
}

/// `registry` plus the custom fields found in the forest's custom
/// properties file, if there is one.
pub fn project_registry(
    registry: &SchemaRegistry,
    forest_dir: &Path,
    project_name: &str,
) -> SyncResult<SchemaRegistry> {
    let path = forest_dir.join(DomainLayout::custom_properties_path(project_name));
    if !path.exists() {
        return Ok(registry.clone());
    }
    let block = parse_element(&fs::read_to_string(&path)?)?;
    let decls = CustomFieldDecl::parse_block(&block)?;
    debug!("{} custom fields from {}", decls.len(), path.display());
    Ok(registry.with_custom_fields(&decls)?)
}
