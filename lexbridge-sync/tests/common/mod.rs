//! Shared fixtures for session tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lexbridge_sync::{BridgeConfig, SyncDriver, SyncError, SyncOutcome, SyncResult};

pub const PROJECT: &str = "Sena";

pub const LP: &str = "10000000-0000-0000-0000-000000000001";
pub const AG1: &str = "20000000-0000-0000-0000-000000000001";

pub const AGENTS_FILE: &str = "Linguistics/MorphologyAndSyntax/AnalyzingAgents.agents";

pub fn project_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<languageproject version="7000072">
	<AdditionalFields>
		<CustomField name="Certified" class="CmAgent" type="Boolean" />
	</AdditionalFields>
	<rt class="CmAgent" guid="{AG1}" ownerguid="{LP}">
		<Version><Uni>1</Uni></Version>
		<Human val="False" />
		<Custom name="Certified" val="False" />
	</rt>
	<rt class="LangProject" guid="{LP}">
		<Name><AUni ws="en">Sena</AUni></Name>
		<AnalyzingAgents><objsur guid="{AG1}" t="o" /></AnalyzingAgents>
	</rt>
</languageproject>
"#
    )
}

/// A project directory holding `Sena.fwdata`.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub config: BridgeConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig {
            project_name: PROJECT.to_string(),
            project_dir: dir.path().to_path_buf(),
            ..BridgeConfig::default()
        };
        std::fs::write(config.project_file(), project_xml()).unwrap();
        Self { dir, config }
    }

    pub fn forest_dir(&self) -> PathBuf {
        self.config.forest_path()
    }

    pub fn project_text(&self) -> String {
        std::fs::read_to_string(self.config.project_file()).unwrap()
    }
}

/// Stands in for the version control system.
#[derive(Default)]
pub struct ScriptedDriver {
    pub calls: usize,
    pub seen: Vec<PathBuf>,
    /// Text replacements applied to the agents file before reporting a pull.
    pub incoming: Option<(String, String)>,
    pub fail: Option<String>,
}

impl SyncDriver for ScriptedDriver {
    fn synchronize(&mut self, forest_dir: &Path) -> SyncResult<SyncOutcome> {
        self.calls += 1;
        self.seen.push(forest_dir.to_path_buf());
        if let Some(message) = &self.fail {
            return Err(SyncError::Driver(message.clone()));
        }
        let Some((from, to)) = &self.incoming else {
            return Ok(SyncOutcome::default());
        };
        let path = forest_dir.join(AGENTS_FILE);
        let text = std::fs::read_to_string(&path)?;
        std::fs::write(&path, text.replace(from.as_str(), to))?;
        Ok(SyncOutcome {
            pulled_changes: true,
        })
    }
}
