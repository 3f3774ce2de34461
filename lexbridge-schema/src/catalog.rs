//! Built-in class catalog.
//!
//! Covers the classes the default domain layout splits out: the project
//! root, morphology and syntax, and the anthropology notebook.

use crate::{ClassDef, DataType, SchemaRegistry};
use DataType::*;

fn class(
    name: &'static str,
    superclass: Option<&'static str>,
    properties: &[(&'static str, DataType)],
) -> ClassDef {
    ClassDef {
        name,
        superclass,
        properties: properties.to_vec(),
    }
}

/// Definitions of every built-in class.
pub(crate) fn definitions() -> Vec<ClassDef> {
    let base = Some("CmObject");
    vec![
        class("CmObject", None, &[]),
        class(
            "LangProject",
            base,
            &[
                ("AnalyzingAgents", OwningCollection),
                ("AnthroList", OwningAtomic),
                ("CurAnalysisWss", Unicode),
                ("CurVernWss", Unicode),
                ("DateCreated", Time),
                ("DateModified", Time),
                ("Description", MultiString),
                ("MorphologicalData", OwningAtomic),
                ("MsFeatureSystem", OwningAtomic),
                ("Name", MultiUnicode),
                ("PartsOfSpeech", OwningAtomic),
                ("ResearchNotebook", OwningAtomic),
            ],
        ),
        class(
            "CmAgent",
            base,
            &[
                ("Evaluations", OwningCollection),
                ("Human", Boolean),
                ("Name", MultiUnicode),
                ("Notes", String),
                ("Version", Unicode),
            ],
        ),
        class(
            "CmAgentEvaluation",
            base,
            &[("Approves", Boolean), ("DateCreated", Time), ("Details", Unicode)],
        ),
        class(
            "MoMorphData",
            base,
            &[
                ("CompoundRules", OwningSequence),
                ("ParserParameters", Unicode),
                ("ProdRestrict", OwningAtomic),
            ],
        ),
        class(
            "MoCompoundRule",
            base,
            &[
                ("Description", MultiString),
                ("Disabled", Boolean),
                ("Name", MultiUnicode),
                ("ToProdRestrict", ReferenceCollection),
            ],
        ),
        class("MoEndoCompound", Some("MoCompoundRule"), &[("HeadLast", Boolean)]),
        class(
            "FsFeatureSystem",
            base,
            &[("Features", OwningCollection), ("Types", OwningCollection)],
        ),
        class(
            "FsClosedFeature",
            base,
            &[
                ("Abbreviation", MultiUnicode),
                ("Name", MultiUnicode),
                ("Values", OwningCollection),
            ],
        ),
        class(
            "FsSymFeatVal",
            base,
            &[("Abbreviation", MultiUnicode), ("Name", MultiUnicode)],
        ),
        class(
            "FsFeatStrucType",
            base,
            &[
                ("Abbreviation", MultiUnicode),
                ("Features", ReferenceSequence),
                ("Name", MultiUnicode),
            ],
        ),
        class(
            "CmPossibilityList",
            base,
            &[
                ("Abbreviation", MultiUnicode),
                ("DateCreated", Time),
                ("DateModified", Time),
                ("Depth", Integer),
                ("IsSorted", Boolean),
                ("ItemClsid", Integer),
                ("Name", MultiUnicode),
                ("Possibilities", OwningSequence),
            ],
        ),
        class(
            "CmPossibility",
            base,
            &[
                ("Abbreviation", MultiUnicode),
                ("Confidence", ReferenceAtomic),
                ("DateCreated", Time),
                ("DateModified", Time),
                ("Description", MultiString),
                ("Name", MultiUnicode),
                ("SubPossibilities", OwningSequence),
            ],
        ),
        class("PartOfSpeech", Some("CmPossibility"), &[("CatalogSourceId", Unicode)]),
        class(
            "RnResearchNbk",
            base,
            &[
                ("DateCreated", Time),
                ("DateModified", Time),
                ("Name", MultiUnicode),
                ("RecTypes", OwningAtomic),
                ("Records", OwningCollection),
            ],
        ),
        class(
            "RnGenericRec",
            base,
            &[
                ("Conclusions", OwningAtomic),
                ("DateCreated", Time),
                ("DateModified", Time),
                ("Researchers", ReferenceCollection),
                ("SeeAlso", ReferenceSequence),
                ("SubRecords", OwningSequence),
                ("Title", String),
                ("Type", ReferenceAtomic),
            ],
        ),
        class(
            "StText",
            base,
            &[("DateModified", Time), ("Paragraphs", OwningSequence)],
        ),
        class("StTxtPara", base, &[("Contents", String)]),
    ]
}

impl SchemaRegistry {
    /// Registry of the built-in catalog.
    pub fn builtin() -> Self {
        Self::resolve(&definitions())
    }
}
