use lexbridge_schema::{
    CustomFieldDecl, PropertyCategory, SchemaRegistry, CUSTOM_PROPERTY_TAG,
};
use lexbridge_types::{guid_key, Document, Element, Node, RECORD_TAG};

use crate::attributes::{normalize_identifiers, sort_attributes};
use crate::custom_fields::{canonicalize_custom_fields, KeyAttribute};
use crate::{CanonError, CanonResult};

/// Tag of a reference marker.
pub const OBJSUR_TAG: &str = "objsur";
/// Identifier attribute on records, nested objects and markers.
pub const GUID_ATTR: &str = "guid";
/// Owner identifier attribute on flat records.
pub const OWNER_ATTR: &str = "ownerguid";

const CLASS_ATTR: &str = "class";
const NAME_ATTR: &str = "name";
const WS_ATTR: &str = "ws";

/// Class of a flat `<rt>` record (its `class` attribute) or of a nested
/// object (its element name).
pub fn class_name(object: &Element) -> CanonResult<&str> {
    if object.name == RECORD_TAG {
        object.attr(CLASS_ATTR).ok_or_else(|| CanonError::MissingAttribute {
            element: RECORD_TAG.to_string(),
            attribute: CLASS_ATTR.to_string(),
        })
    } else {
        Ok(&object.name)
    }
}

/// Lower-cased identifier of an element, if it has one.
pub fn identifier_key(element: &Element) -> Option<String> {
    element.attr(GUID_ATTR).map(guid_key)
}

/// Sort key of a property element: its tag, or its `name` for custom ones.
pub fn property_key(property: &Element) -> String {
    if property.name == CUSTOM_PROPERTY_TAG {
        property.attr(NAME_ATTR).unwrap_or_default().to_string()
    } else {
        property.name.clone()
    }
}

/// Builds a reference marker; `owning` selects `t="o"` over `t="r"`.
pub fn objsur(guid: &str, owning: bool) -> Element {
    Element::new(OBJSUR_TAG)
        .with_attr(GUID_ATTR, guid_key(guid))
        .with_attr("t", if owning { "o" } else { "r" })
}

/// Applies the canonical ordering rules using a schema registry.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    /// Category of a property element found on an object of `class`.
    pub fn property_category(&self, class: &str, property: &Element) -> CanonResult<PropertyCategory> {
        if property.name == CUSTOM_PROPERTY_TAG {
            let name = property.attr(NAME_ATTR).ok_or_else(|| CanonError::MissingAttribute {
                element: CUSTOM_PROPERTY_TAG.to_string(),
                attribute: NAME_ATTR.to_string(),
            })?;
            Ok(self.registry.custom_property(class, name)?.category)
        } else {
            Ok(self.registry.property(class, &property.name)?.category)
        }
    }

    /// Canonicalizes one object: a flat record or a nested object element,
    /// including everything it owns inline.
    pub fn canonicalize_object(&self, object: &Element) -> CanonResult<Element> {
        let class = class_name(object)?;
        self.registry.class_of(class)?;

        let mut head = object.emptied();
        normalize_identifiers(&mut head);
        if head.attributes.len() > 1 {
            head.attributes.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut properties = Vec::new();
        for node in &object.children {
            match node {
                Node::Element(property) => {
                    let category = self.property_category(class, property)?;
                    let canonical = self.canonicalize_property(property, category)?;
                    properties.push((property_key(property), canonical));
                }
                Node::Text(text) => head.children.push(Node::Text(text.clone())),
            }
        }
        properties.sort_by(|a, b| a.0.cmp(&b.0));
        head.children
            .extend(properties.into_iter().map(|(_, p)| Node::Element(p)));
        Ok(head)
    }

    /// Canonicalizes one property element according to its category.
    pub fn canonicalize_property(
        &self,
        property: &Element,
        category: PropertyCategory,
    ) -> CanonResult<Element> {
        let mut head = property.emptied();
        if head.attributes.len() > 1 {
            head.attributes.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut elements = Vec::new();
        for node in &property.children {
            match node {
                Node::Text(text) => head.children.push(Node::Text(text.clone())),
                Node::Element(child) if child.name == OBJSUR_TAG => {
                    let mut marker = sort_attributes(child);
                    normalize_identifiers(&mut marker);
                    elements.push(marker);
                }
                Node::Element(child) if category.is_owning() => {
                    elements.push(self.canonicalize_object(child)?);
                }
                Node::Element(child) => elements.push(sort_attributes(child)),
            }
        }

        if category.is_collection() {
            elements.sort_by_cached_key(|e| identifier_key(e).unwrap_or_default());
            elements.dedup_by(|a, b| match (identifier_key(a), identifier_key(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            });
        } else if category.is_multi_alternative() {
            elements.sort_by(|a, b| a.attr(WS_ATTR).cmp(&b.attr(WS_ATTR)));
        }

        head.children.extend(elements.into_iter().map(Node::Element));
        Ok(head)
    }

    /// Orders top-level records by identifier.
    pub fn order_records(mut records: Vec<Element>) -> Vec<Element> {
        records.sort_by_cached_key(|r| identifier_key(r).unwrap_or_default());
        records
    }

    /// Canonicalizes a whole monolithic document.
    ///
    /// Custom field declarations are sorted and carry no `key` attribute in
    /// this form.
    pub fn canonicalize_document(&self, document: &Document) -> CanonResult<Document> {
        let (custom_fields, decls) = match &document.custom_fields {
            Some(block) => (
                Some(canonicalize_custom_fields(block, KeyAttribute::Strip)?),
                CustomFieldDecl::parse_block(block)?,
            ),
            None => (None, Vec::new()),
        };
        let scoped = self.registry.with_custom_fields(&decls)?;
        let inner = Canonicalizer::new(&scoped);

        let records = document
            .records
            .iter()
            .map(|r| inner.canonicalize_object(r))
            .collect::<CanonResult<Vec<_>>>()?;

        Ok(Document {
            root: sort_attributes(&document.root),
            custom_fields,
            records: Self::order_records(records),
        })
    }
}
