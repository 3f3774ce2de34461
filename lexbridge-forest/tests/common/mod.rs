//! Shared fixtures for forest tests.

#![allow(dead_code)]

use lexbridge_types::Document;

pub const PROJECT: &str = "Sena";

pub const LP: &str = "10000000-0000-0000-0000-000000000001";
pub const AG1: &str = "20000000-0000-0000-0000-000000000001";
pub const AG2: &str = "20000000-0000-0000-0000-000000000002";
pub const EV1: &str = "21000000-0000-0000-0000-000000000001";
pub const MD: &str = "30000000-0000-0000-0000-000000000001";
pub const CR1: &str = "31000000-0000-0000-0000-000000000002";
pub const CR2: &str = "31000000-0000-0000-0000-000000000001";
pub const PRL: &str = "32000000-0000-0000-0000-000000000001";
pub const PR1: &str = "33000000-0000-0000-0000-000000000001";
pub const POSL: &str = "40000000-0000-0000-0000-000000000001";
pub const POS1: &str = "41000000-0000-0000-0000-000000000001";
pub const NB: &str = "50000000-0000-0000-0000-000000000001";
pub const REC1: &str = "51000000-0000-0000-0000-000000000002";
pub const REC2: &str = "51000000-0000-0000-0000-000000000001";
pub const SUB: &str = "52000000-0000-0000-0000-000000000001";

/// A small project touching every default boundary except the feature
/// system and the anthropology list. Records are deliberately out of order,
/// some identifiers upper-cased.
pub fn project_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<languageproject version="7000072">
	<AdditionalFields>
		<CustomField name="Certified" class="CmAgent" type="Boolean" />
	</AdditionalFields>
	<rt class="RnGenericRec" guid="{REC1}" ownerguid="{NB}">
		<Title><Str><Run ws="en">Field trip</Run></Str></Title>
		<SubRecords><objsur guid="{SUB}" t="o" /></SubRecords>
		<Researchers><objsur guid="{AG1}" t="r" /></Researchers>
	</rt>
	<rt class="CmAgent" guid="{AG2}" ownerguid="{LP}">
		<Human val="False" />
	</rt>
	<rt class="LangProject" guid="{LP}">
		<ResearchNotebook><objsur guid="{NB}" t="o" /></ResearchNotebook>
		<PartsOfSpeech><objsur guid="{POSL}" t="o" /></PartsOfSpeech>
		<Name><AUni ws="fr">sena</AUni><AUni ws="en">Sena</AUni></Name>
		<MorphologicalData><objsur guid="{MD}" t="o" /></MorphologicalData>
		<AnalyzingAgents>
			<objsur guid="{AG2}" t="o" />
			<objsur guid="{}" t="o" />
		</AnalyzingAgents>
	</rt>
	<rt class="CmAgent" guid="{AG1}" ownerguid="{LP}">
		<Name><AUni ws="en">Parser</AUni></Name>
		<Human val="False" />
		<Evaluations><objsur guid="{EV1}" t="o" /></Evaluations>
		<Custom name="Certified" val="True" />
	</rt>
	<rt class="CmAgentEvaluation" guid="{EV1}" ownerguid="{AG1}">
		<Approves val="True" />
	</rt>
	<rt class="MoMorphData" guid="{MD}" ownerguid="{LP}">
		<ProdRestrict><objsur guid="{PRL}" t="o" /></ProdRestrict>
		<CompoundRules>
			<objsur guid="{CR1}" t="o" />
			<objsur guid="{CR2}" t="o" />
		</CompoundRules>
	</rt>
	<rt class="MoCompoundRule" guid="{CR1}" ownerguid="{MD}">
		<ToProdRestrict><objsur guid="{PR1}" t="r" /></ToProdRestrict>
		<Disabled val="False" />
	</rt>
	<rt class="MoEndoCompound" guid="{CR2}" ownerguid="{MD}">
		<HeadLast val="True" />
	</rt>
	<rt class="CmPossibilityList" guid="{PRL}" ownerguid="{MD}">
		<Possibilities><objsur guid="{PR1}" t="o" /></Possibilities>
	</rt>
	<rt class="CmPossibility" guid="{PR1}" ownerguid="{PRL}">
		<Name><AUni ws="en">restricted</AUni></Name>
	</rt>
	<rt class="CmPossibilityList" guid="{POSL}" ownerguid="{LP}">
		<Possibilities><objsur guid="{POS1}" t="o" /></Possibilities>
	</rt>
	<rt class="PartOfSpeech" guid="{POS1}" ownerguid="{POSL}">
		<CatalogSourceId><Uni>Noun</Uni></CatalogSourceId>
	</rt>
	<rt class="RnResearchNbk" guid="{NB}" ownerguid="{LP}">
		<Records>
			<objsur guid="{REC1}" t="o" />
			<objsur guid="{REC2}" t="o" />
		</Records>
	</rt>
	<rt class="RnGenericRec" guid="{REC2}" ownerguid="{NB}">
		<Title><Str><Run ws="en">Interview</Run></Str></Title>
	</rt>
	<rt class="RnGenericRec" guid="{SUB}" ownerguid="{REC1}">
		<Title><Str><Run ws="en">Day one</Run></Str></Title>
	</rt>
</languageproject>
"#,
        AG1.to_uppercase()
    )
}

pub fn project() -> Document {
    Document::parse(&project_xml()).expect("fixture parses")
}

/// A project with only the root object and its agents.
pub fn agents_only(with_agents: bool) -> Document {
    let agents = if with_agents {
        format!(
            r#"<rt class="CmAgent" guid="{AG1}" ownerguid="{LP}"><Human val="True" /></rt>"#
        )
    } else {
        String::new()
    };
    let markers = if with_agents {
        format!(r#"<objsur guid="{AG1}" t="o" />"#)
    } else {
        String::new()
    };
    Document::parse(&format!(
        r#"<languageproject version="7000072">
	<rt class="LangProject" guid="{LP}"><AnalyzingAgents>{markers}</AnalyzingAgents></rt>
	{agents}
</languageproject>"#
    ))
    .expect("fixture parses")
}
