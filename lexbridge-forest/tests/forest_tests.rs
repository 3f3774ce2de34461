mod common;

use std::path::{Path, PathBuf};

use common::*;
use lexbridge_canon::{identifier_key, Canonicalizer};
use lexbridge_forest::{join, split, Boundary, DomainLayout, FileForest, ForestError, HEADER_TAG};
use lexbridge_schema::SchemaRegistry;
use lexbridge_types::{parse_element, Document, Element, Guid};
use pretty_assertions::assert_eq;

fn morph(file: &str) -> PathBuf {
    Path::new("Linguistics/MorphologyAndSyntax").join(file)
}

fn split_default(document: &Document) -> FileForest {
    split(
        document,
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap()
    .forest
}

fn join_default(forest: &FileForest) -> Result<Document, ForestError> {
    join(forest, &SchemaRegistry::builtin(), &DomainLayout::default(), PROJECT)
}

fn canonical(document: &Document) -> Document {
    let registry = SchemaRegistry::builtin();
    Canonicalizer::new(&registry)
        .canonicalize_document(document)
        .unwrap()
}

fn guids<'a>(elements: impl Iterator<Item = &'a Element>) -> Vec<String> {
    elements.filter_map(identifier_key).collect()
}

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn join_of_split_is_canonical_form() {
    let document = project();
    let joined = join_default(&split_default(&document)).unwrap();
    let expected = canonical(&document);
    assert_eq!(joined.to_xml(), expected.to_xml());
    assert_eq!(joined, expected);
}

#[test]
fn split_is_deterministic() {
    let a = split_default(&project());
    let b = split_default(&canonical(&project()));
    assert_eq!(a, b);
}

#[test]
fn index_records_every_object() {
    let decomposition = split(
        &project(),
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap();
    assert_eq!(decomposition.index.len(), 15);
    assert_eq!(
        decomposition.index.class_of(&Guid::parse(CR2).unwrap()),
        Some("MoEndoCompound")
    );
}

// ── File layout ──────────────────────────────────────────────────

#[test]
fn split_writes_expected_files() {
    let forest = split_default(&project());
    let paths: Vec<PathBuf> = forest.keys().cloned().collect();
    let mut expected = vec![
        PathBuf::from("General/Sena.langproj"),
        PathBuf::from("General/Sena.CustomProperties"),
        morph("AnalyzingAgents.agents"),
        morph("MorphAndSynData.morphdata"),
        morph("PartsOfSpeech.list"),
        morph("ProdRestrict.list"),
        PathBuf::from("Anthropology/DataNotebook.ntbk"),
    ];
    expected.sort();
    assert_eq!(paths, expected);
}

#[test]
fn root_file_keeps_boundary_properties_empty() {
    let forest = split_default(&project());
    let root = &forest[&DomainLayout::root_path(PROJECT)];
    assert_eq!(root.name, "languageproject");
    assert_eq!(root.attr("version"), Some("7000072"));

    let lp = root.child("LangProject").unwrap();
    assert_eq!(lp.attr("guid"), Some(LP));
    assert_eq!(lp.attr("class"), None);
    for property in ["AnalyzingAgents", "MorphologicalData", "PartsOfSpeech", "ResearchNotebook"] {
        let p = lp.child(property).unwrap();
        assert!(!p.has_elements(), "{property} should be empty");
    }
    // non-boundary data stays
    assert_eq!(lp.child("Name").unwrap().elements().count(), 2);
}

#[test]
fn agents_file_nests_owned_objects_by_identifier() {
    let forest = split_default(&project());
    let agents = &forest[&morph("AnalyzingAgents.agents")];
    assert_eq!(agents.name, "AnalyzingAgents");
    assert_eq!(guids(agents.elements()), [AG1, AG2]);

    let first = agents.elements().next().unwrap();
    assert_eq!(first.name, "CmAgent");
    assert_eq!(first.attr("ownerguid"), None);
    let evaluation = first.child("Evaluations").unwrap().child("CmAgentEvaluation").unwrap();
    assert_eq!(evaluation.attr("guid"), Some(EV1));
}

#[test]
fn sequence_order_survives_nesting() {
    let forest = split_default(&project());
    let data = &forest[&morph("MorphAndSynData.morphdata")];
    let rules = data
        .child("MoMorphData")
        .unwrap()
        .child("CompoundRules")
        .unwrap();
    assert_eq!(guids(rules.elements()), [CR1, CR2]);
}

#[test]
fn nested_boundary_gets_its_own_file() {
    let forest = split_default(&project());
    let data = &forest[&morph("MorphAndSynData.morphdata")];
    let holder = data.child("MoMorphData").unwrap().child("ProdRestrict").unwrap();
    assert!(!holder.has_elements());

    let restrict = &forest[&morph("ProdRestrict.list")];
    assert_eq!(restrict.name, "ProdRestrict");
    let list = restrict.child("CmPossibilityList").unwrap();
    assert_eq!(list.attr("guid"), Some(PRL));
    assert!(list.child("Possibilities").unwrap().child("CmPossibility").is_some());
}

#[test]
fn notebook_file_has_header_and_records() {
    let forest = split_default(&project());
    let notebook = &forest[&PathBuf::from("Anthropology/DataNotebook.ntbk")];
    let header = notebook.child(HEADER_TAG).unwrap();
    let nbk = header.child("RnResearchNbk").unwrap();
    assert_eq!(nbk.attr("guid"), Some(NB));
    assert!(!nbk.child("Records").unwrap().has_elements());

    let records: Vec<&Element> = notebook.elements().filter(|e| e.name != HEADER_TAG).collect();
    assert_eq!(guids(records.iter().copied()), [REC2, REC1]);
    let sub = records[1].child("SubRecords").unwrap().child("RnGenericRec").unwrap();
    assert_eq!(sub.attr("guid"), Some(SUB));
    // references stay markers
    let researcher = records[1].child("Researchers").unwrap().child("objsur").unwrap();
    assert_eq!(researcher.attr("t"), Some("r"));
}

#[test]
fn custom_properties_file_carries_keys() {
    let forest = split_default(&project());
    let block = &forest[&DomainLayout::custom_properties_path(PROJECT)];
    let field = block.child("CustomField").unwrap();
    assert_eq!(field.attr("key"), Some("CmAgentCertified"));

    let joined = join_default(&forest).unwrap();
    let restored = joined.custom_fields.unwrap();
    assert_eq!(restored.child("CustomField").unwrap().attr("key"), None);
}

// ── Empty domains ────────────────────────────────────────────────

#[test]
fn empty_domain_writes_no_file() {
    let document = agents_only(false);
    let forest = split_default(&document);
    assert!(!forest.contains_key(&morph("AnalyzingAgents.agents")));

    let joined = join_default(&forest).unwrap();
    assert_eq!(joined, canonical(&document));
}

#[test]
fn agents_only_round_trip() {
    let document = agents_only(true);
    let forest = split_default(&document);
    assert_eq!(forest.len(), 2);
    assert_eq!(join_default(&forest).unwrap(), canonical(&document));
}

#[test]
fn owner_property_inserted_when_absent() {
    let mut forest = split_default(&agents_only(true));
    let root_path = DomainLayout::root_path(PROJECT);
    let bare = parse_element(&format!(
        r#"<languageproject version="7000072"><LangProject guid="{LP}" /></languageproject>"#
    ))
    .unwrap();
    forest.insert(root_path, bare);

    let joined = join_default(&forest).unwrap();
    let lp = &joined.records[0];
    let agents = lp.child("AnalyzingAgents").unwrap();
    assert_eq!(guids(agents.elements()), [AG1]);
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn duplicate_identifier_is_rejected() {
    let document = Document::parse(&format!(
        r#"<languageproject>
	<rt class="LangProject" guid="{LP}" />
	<rt class="CmAgent" guid="{}" />
</languageproject>"#,
        LP.to_uppercase()
    ))
    .unwrap();
    let err = split(
        &document,
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap_err();
    assert!(matches!(err, ForestError::DuplicateIdentifier(ref g) if g == LP));
}

#[test]
fn unknown_class_is_schema_error() {
    let document = Document::parse(&format!(
        r#"<languageproject><rt class="Widget" guid="{LP}" /></languageproject>"#
    ))
    .unwrap();
    let err = split(
        &document,
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap_err();
    assert!(matches!(err, ForestError::Schema(_)));
}

#[test]
fn unreachable_record_is_corrupt() {
    let document = Document::parse(&format!(
        r#"<languageproject>
	<rt class="LangProject" guid="{LP}" />
	<rt class="CmAgent" guid="{AG1}" ownerguid="{LP}" />
</languageproject>"#
    ))
    .unwrap();
    let err = split(
        &document,
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap_err();
    assert!(matches!(err, ForestError::CorruptForest(_)));
}

#[test]
fn owning_marker_to_missing_object_is_corrupt() {
    let document = Document::parse(&format!(
        r#"<languageproject>
	<rt class="LangProject" guid="{LP}"><AnalyzingAgents><objsur guid="{AG1}" t="o" /></AnalyzingAgents></rt>
</languageproject>"#
    ))
    .unwrap();
    let err = split(
        &document,
        &SchemaRegistry::builtin(),
        &DomainLayout::default(),
        PROJECT,
    )
    .unwrap_err();
    assert!(matches!(err, ForestError::CorruptForest(_)));
}

#[test]
fn missing_root_file_is_corrupt() {
    let mut forest = split_default(&agents_only(true));
    forest.remove(&DomainLayout::root_path(PROJECT));
    assert!(matches!(join_default(&forest), Err(ForestError::CorruptForest(_))));
}

#[test]
fn boundary_file_without_owner_is_missing_owner() {
    let mut forest = split_default(&agents_only(true));
    forest.insert(
        DomainLayout::root_path(PROJECT),
        parse_element(r#"<languageproject version="7000072" />"#).unwrap(),
    );
    let err = join_default(&forest).unwrap_err();
    assert!(matches!(err, ForestError::MissingOwner { ref owner_class, .. } if owner_class == "LangProject"));
}

#[test]
fn missing_mandatory_file_is_corrupt() {
    let mut layout = DomainLayout::default();
    for boundary in &mut layout.boundaries {
        if boundary.property == "AnalyzingAgents" {
            boundary.mandatory = true;
        }
    }
    let registry = SchemaRegistry::builtin();
    let forest = split(&agents_only(false), &registry, &layout, PROJECT)
        .unwrap()
        .forest;
    assert!(matches!(
        join(&forest, &registry, &layout, PROJECT),
        Err(ForestError::CorruptForest(_))
    ));
}

#[test]
fn dangling_reference_is_corrupt() {
    let document = Document::parse(&format!(
        r#"<languageproject>
	<rt class="LangProject" guid="{LP}"><AnalyzingAgents><objsur guid="{AG1}" t="o" /></AnalyzingAgents></rt>
	<rt class="CmAgent" guid="{AG1}" ownerguid="{LP}" />
	<rt class="CmPossibilityList" guid="{POSL}"><Possibilities><objsur guid="{POS1}" t="o" /></Possibilities></rt>
	<rt class="CmPossibility" guid="{POS1}" ownerguid="{POSL}"><Confidence><objsur guid="{PR1}" t="r" /></Confidence></rt>
</languageproject>"#
    ))
    .unwrap();
    let forest = split_default(&document);
    let err = join_default(&forest).unwrap_err();
    assert!(matches!(err, ForestError::CorruptForest(ref m) if m.contains(PR1)));
}

#[test]
fn duplicate_across_files_is_rejected() {
    let mut forest = split_default(&agents_only(true));
    let agents_path = morph("AnalyzingAgents.agents");
    let mut agents = forest[&agents_path].clone();
    let copy = agents.elements().next().unwrap().clone();
    agents = agents.with_child(copy);
    forest.insert(agents_path, agents);
    assert!(matches!(
        join_default(&forest),
        Err(ForestError::DuplicateIdentifier(_))
    ));
}

// ── Layout ───────────────────────────────────────────────────────

#[test]
fn layout_rejects_reference_property() {
    let layout = DomainLayout {
        boundaries: vec![Boundary::new(
            "RnGenericRec",
            "Researchers",
            "Anthropology",
            "Researchers.list",
            "Researchers",
        )],
    };
    assert!(matches!(
        layout.validate(&SchemaRegistry::builtin()),
        Err(ForestError::InvalidLayout(_))
    ));
}

#[test]
fn default_layout_is_valid() {
    DomainLayout::default()
        .validate(&SchemaRegistry::builtin())
        .unwrap();
}

#[test]
fn layout_deserializes_with_defaults() {
    let json = r#"{"boundaries":[{"owner_class":"LangProject","property":"AnthroList",
        "domain":"Anthropology","file_name":"AnthropologyList.list","root_tag":"AnthroList"}]}"#;
    let layout: DomainLayout = serde_json::from_str(json).unwrap();
    let boundary = &layout.boundaries[0];
    assert!(!boundary.mandatory);
    assert_eq!(boundary.header_children, None);
    assert_eq!(
        boundary.relative_path(),
        PathBuf::from("Anthropology/AnthropologyList.list")
    );
}
