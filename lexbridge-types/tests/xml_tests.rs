use lexbridge_types::{parse_element, write_document, write_element, Document, Element, Node, XmlError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_drops_whitespace_and_declaration() {
    let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<a>\n\t<b x=\"1\" />\n</a>\n";
    let root = parse_element(xml).unwrap();
    assert_eq!(root, Element::new("a").with_child(Element::new("b").with_attr("x", "1")));
}

#[test]
fn parse_keeps_text_and_unescapes() {
    let root = parse_element(r#"<Run ws="en">fish &amp; chips</Run>"#).unwrap();
    assert_eq!(root.text(), "fish & chips");
    assert_eq!(root.attr("ws"), Some("en"));
}

#[test]
fn parse_unescapes_attributes() {
    let root = parse_element(r#"<a v="&lt;x&gt;" />"#).unwrap();
    assert_eq!(root.attr("v"), Some("<x>"));
}

#[test]
fn parse_ignores_comments() {
    let root = parse_element("<a><!-- note --><b /></a>").unwrap();
    assert_eq!(root.children.len(), 1);
}

#[test]
fn parse_cdata_as_text() {
    let root = parse_element("<a><![CDATA[1 < 2]]></a>").unwrap();
    assert_eq!(root.children, vec![Node::Text("1 < 2".to_string())]);
}

#[test]
fn parse_unclosed_is_error() {
    let err = parse_element("<a><b></b>").unwrap_err();
    assert!(matches!(err, XmlError::UnexpectedEof(name) if name == "a"));
}

#[test]
fn parse_mismatched_is_error() {
    assert!(parse_element("<a><b></a></b>").is_err());
}

#[test]
fn parse_empty_input_has_no_root() {
    assert!(matches!(parse_element("  "), Err(XmlError::NoRoot)));
}

#[test]
fn parse_two_roots_is_error() {
    assert!(parse_element("<a /><b />").is_err());
}

// ── Writing ──────────────────────────────────────────────────────

#[test]
fn write_uses_tabs_and_self_closing_tags() {
    let root = Element::new("Prop")
        .with_child(Element::new("objsur").with_attr("guid", "g1").with_attr("t", "o"));
    assert_eq!(
        write_element(&root),
        "<Prop>\n\t<objsur guid=\"g1\" t=\"o\" />\n</Prop>\n"
    );
}

#[test]
fn write_text_inline() {
    let root = Element::new("Str").with_child(
        Element::new("Run").with_attr("ws", "en").with_text("a < b"),
    );
    assert_eq!(
        write_element(&root),
        "<Str>\n\t<Run ws=\"en\">a &lt; b</Run>\n</Str>\n"
    );
}

#[test]
fn write_document_has_declaration() {
    let out = write_document(&Element::new("x"));
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
    assert!(out.ends_with("<x />\n"));
}

#[test]
fn write_then_parse_preserves_mixed_content() {
    let root = Element::new("AStr")
        .with_attr("ws", "en")
        .with_child(Element::new("Run").with_attr("ws", "en").with_text("Hello "))
        .with_child(Element::new("Run").with_attr("ws", "fr").with_text("monde"));
    let reparsed = parse_element(&write_element(&root)).unwrap();
    assert_eq!(reparsed, root);
}

// ── Document ─────────────────────────────────────────────────────

const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<languageproject version="7000037">
	<AdditionalFields>
		<CustomField class="LangProject" name="Extra" type="Unicode" />
	</AdditionalFields>
	<rt class="LangProject" guid="a0000000-0000-0000-0000-000000000001" />
	<rt class="CmAgent" guid="a0000000-0000-0000-0000-000000000002" ownerguid="a0000000-0000-0000-0000-000000000001" />
</languageproject>
"#;

#[test]
fn document_splits_header_and_records() {
    let doc = Document::parse(DOC).unwrap();
    assert_eq!(doc.root.name, "languageproject");
    assert_eq!(doc.root.attr("version"), Some("7000037"));
    assert!(doc.root.children.is_empty());
    assert!(doc.custom_fields.is_some());
    assert_eq!(doc.records.len(), 2);
}

#[test]
fn document_serialization_is_stable() {
    let doc = Document::parse(DOC).unwrap();
    assert_eq!(doc.to_xml(), DOC);
}

#[test]
fn document_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("Sample.fwdata");
    let doc = Document::parse(DOC).unwrap();
    doc.write(&path).unwrap();
    let read = Document::read(&path).unwrap();
    assert_eq!(read, doc);
}

// ── Properties ───────────────────────────────────────────────────

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9<>&\"' ]{0,24}")
        .unwrap()
        .prop_filter("non-blank", |s| !s.trim().is_empty())
}

proptest! {
    /// Any attribute value and non-blank text survives write then parse.
    #[test]
    fn escaping_roundtrips(value in text_strategy(), text in text_strategy()) {
        let root = Element::new("a")
            .with_attr("v", value)
            .with_child(Element::new("b").with_text(text));
        let reparsed = parse_element(&write_element(&root)).unwrap();
        prop_assert_eq!(reparsed, root);
    }
}
