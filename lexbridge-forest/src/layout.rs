//! Domain layout: which owning properties are split out into which files.

use std::path::PathBuf;

use lexbridge_schema::{PropertyCategory, SchemaRegistry};
use serde::{Deserialize, Serialize};

use crate::{ForestError, ForestResult};

/// Directory holding the root and custom property files.
pub const GENERAL_DOMAIN: &str = "General";

/// Element wrapping the owner object inside a header file.
pub const HEADER_TAG: &str = "header";

/// One owning property whose objects live in their own file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    /// Class (or superclass) of the owner.
    pub owner_class: String,
    /// Owning property on that class.
    pub property: String,
    /// Directory of the file, relative to the forest root.
    pub domain: String,
    pub file_name: String,
    /// Root tag of the file.
    pub root_tag: String,
    /// When set, the owned object is written as a `header` and the children
    /// of this property become the file's top-level records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_children: Option<String>,
    /// Recomposition fails when the file is absent.
    #[serde(default)]
    pub mandatory: bool,
}

impl Boundary {
    pub fn new(
        owner_class: &str,
        property: &str,
        domain: &str,
        file_name: &str,
        root_tag: &str,
    ) -> Self {
        Self {
            owner_class: owner_class.to_string(),
            property: property.to_string(),
            domain: domain.to_string(),
            file_name: file_name.to_string(),
            root_tag: root_tag.to_string(),
            header_children: None,
            mandatory: false,
        }
    }

    #[must_use]
    pub fn with_header(mut self, children_property: &str) -> Self {
        self.header_children = Some(children_property.to_string());
        self
    }

    /// Path of the file relative to the forest root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.domain).join(&self.file_name)
    }
}

/// Ordered list of boundaries.
///
/// Order matters: a boundary nested inside another one's file must come
/// after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainLayout {
    pub boundaries: Vec<Boundary>,
}

impl Default for DomainLayout {
    fn default() -> Self {
        Self::fieldworks()
    }
}

impl DomainLayout {
    /// The FieldWorks project layout.
    pub fn fieldworks() -> Self {
        const MORPH: &str = "Linguistics/MorphologyAndSyntax";
        const ANTHRO: &str = "Anthropology";
        Self {
            boundaries: vec![
                Boundary::new(
                    "LangProject",
                    "MsFeatureSystem",
                    MORPH,
                    "MorphAndSynFeatureSystem.featsys",
                    "FeatureSystem",
                ),
                Boundary::new(
                    "LangProject",
                    "PartsOfSpeech",
                    MORPH,
                    "PartsOfSpeech.list",
                    "PartsOfSpeech",
                ),
                Boundary::new(
                    "LangProject",
                    "AnalyzingAgents",
                    MORPH,
                    "AnalyzingAgents.agents",
                    "AnalyzingAgents",
                ),
                Boundary::new(
                    "LangProject",
                    "MorphologicalData",
                    MORPH,
                    "MorphAndSynData.morphdata",
                    "MorphAndSynData",
                ),
                Boundary::new(
                    "MoMorphData",
                    "ProdRestrict",
                    MORPH,
                    "ProdRestrict.list",
                    "ProdRestrict",
                ),
                Boundary::new(
                    "LangProject",
                    "ResearchNotebook",
                    ANTHRO,
                    "DataNotebook.ntbk",
                    "Anthropology",
                )
                .with_header("Records"),
                Boundary::new(
                    "LangProject",
                    "AnthroList",
                    ANTHRO,
                    "AnthropologyList.list",
                    "AnthroList",
                ),
            ],
        }
    }

    /// Path of the mandatory file holding the unowned objects.
    pub fn root_path(project_name: &str) -> PathBuf {
        PathBuf::from(GENERAL_DOMAIN).join(format!("{project_name}.langproj"))
    }

    /// Path of the custom property declarations file.
    pub fn custom_properties_path(project_name: &str) -> PathBuf {
        PathBuf::from(GENERAL_DOMAIN).join(format!("{project_name}.CustomProperties"))
    }

    /// Every path the engines read or write for a project.
    pub fn managed_paths(&self, project_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![
            Self::root_path(project_name),
            Self::custom_properties_path(project_name),
        ];
        paths.extend(self.boundaries.iter().map(Boundary::relative_path));
        paths
    }

    /// The boundary split out of `property` on objects of `class`, if any.
    pub fn boundary_for(
        &self,
        registry: &SchemaRegistry,
        class: &str,
        property: &str,
    ) -> ForestResult<Option<&Boundary>> {
        let info = registry.class_of(class)?;
        Ok(self
            .boundaries
            .iter()
            .find(|b| b.property == property && info.is_a(&b.owner_class)))
    }

    /// Checks every boundary names an owning property known to the registry.
    pub fn validate(&self, registry: &SchemaRegistry) -> ForestResult<()> {
        let mut seen = Vec::new();
        for boundary in &self.boundaries {
            let category = registry
                .property(&boundary.owner_class, &boundary.property)?
                .category;
            if !category.is_owning() {
                return Err(ForestError::InvalidLayout(format!(
                    "{}.{} is not an owning property",
                    boundary.owner_class, boundary.property
                )));
            }
            if let Some(children) = &boundary.header_children {
                if category != PropertyCategory::AtomicOwning {
                    return Err(ForestError::InvalidLayout(format!(
                        "{}.{} must be atomic to carry a header",
                        boundary.owner_class, boundary.property
                    )));
                }
                if children.is_empty() {
                    return Err(ForestError::InvalidLayout(format!(
                        "{}.{} names an empty header property",
                        boundary.owner_class, boundary.property
                    )));
                }
            }
            let path = boundary.relative_path();
            if seen.contains(&path) {
                return Err(ForestError::InvalidLayout(format!(
                    "{} is named twice",
                    path.display()
                )));
            }
            seen.push(path);
        }
        Ok(())
    }
}
