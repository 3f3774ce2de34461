//! Per-project bridge configuration, stored as `lexbridge.json` next to the
//! project file.

use std::fs;
use std::path::{Path, PathBuf};

use lexbridge_forest::DomainLayout;
use lexbridge_merge::ConflictPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{SyncError, SyncResult};

/// Name of the configuration file inside the project directory.
pub const CONFIG_FILE: &str = "lexbridge.json";

/// Extension of the monolithic project file.
pub const PROJECT_EXTENSION: &str = "fwdata";

const DEFAULT_PROJECT_NAME: &str = "Project";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Project name; also the stem of the project and root domain files.
    pub project_name: String,
    /// Directory holding the monolithic project file.
    pub project_dir: PathBuf,
    /// Root of the domain file forest. Defaults to
    /// `<project_dir>/<project_name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forest_dir: Option<PathBuf>,
    pub layout: DomainLayout,
    pub conflict_policy: ConflictPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            project_dir: PathBuf::from("."),
            forest_dir: None,
            layout: DomainLayout::default(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Default configuration for a project directory, named after it.
    pub fn for_project(project_dir: &Path) -> Self {
        let project_name = project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_PROJECT_NAME)
            .to_string();
        Self {
            project_name,
            project_dir: project_dir.to_path_buf(),
            ..Self::default()
        }
    }

    /// Loads `lexbridge.json` from `project_dir`, falling back to
    /// [`BridgeConfig::for_project`] when there is none.
    ///
    /// The loaded `project_dir` always points at the directory it was
    /// loaded from.
    pub fn load(project_dir: &Path) -> SyncResult<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No {} in {}, using defaults", CONFIG_FILE, project_dir.display());
            return Ok(Self::for_project(project_dir));
        }
        let contents = fs::read_to_string(&path)?;
        let mut config: Self = serde_json::from_str(&contents)?;
        config.project_dir = project_dir.to_path_buf();
        config.validate()?;
        info!("Loaded {}", path.display());
        Ok(config)
    }

    /// Writes the configuration to `<project_dir>/lexbridge.json`.
    pub fn save(&self) -> SyncResult<()> {
        self.validate()?;
        fs::create_dir_all(&self.project_dir)?;
        let path = self.project_dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> SyncResult<()> {
        let name = self.project_name.trim();
        if name.is_empty() {
            return Err(SyncError::Config("project name is empty".to_string()));
        }
        if name.contains(['/', '\\']) {
            return Err(SyncError::Config(format!(
                "project name {name:?} contains a path separator"
            )));
        }
        Ok(())
    }

    /// Root of the domain file forest.
    pub fn forest_path(&self) -> PathBuf {
        self.forest_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join(&self.project_name))
    }

    /// The monolithic project file, `<project_dir>/<project_name>.fwdata`.
    pub fn project_file(&self) -> PathBuf {
        self.project_dir
            .join(format!("{}.{PROJECT_EXTENSION}", self.project_name))
    }
}
