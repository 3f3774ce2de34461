//! Recomposition: file forest → monolithic document.

use std::collections::BTreeMap;
use std::path::Path;

use lexbridge_canon::{objsur, property_key, Canonicalizer, GUID_ATTR, KEY_ATTR, OBJSUR_TAG, OWNER_ATTR};
use lexbridge_schema::{CustomFieldDecl, SchemaRegistry};
use lexbridge_types::{Document, Element, Guid, Node, RECORD_TAG};
use tracing::{debug, info, warn};

use crate::layout::{Boundary, HEADER_TAG};
use crate::{DomainLayout, FileForest, ForestError, ForestResult};

/// Restores the monolithic document from a file forest.
///
/// The input is expected to be canonical; the output keeps whatever order
/// the files carry, with records in identifier order.
pub fn join(
    forest: &FileForest,
    registry: &SchemaRegistry,
    layout: &DomainLayout,
    project_name: &str,
) -> ForestResult<Document> {
    layout.validate(registry)?;

    let custom_fields = forest
        .get(&DomainLayout::custom_properties_path(project_name))
        .map(strip_keys);
    let decls = match &custom_fields {
        Some(block) => CustomFieldDecl::parse_block(block)?,
        None => Vec::new(),
    };
    let scoped = registry.with_custom_fields(&decls)?;

    let root_path = DomainLayout::root_path(project_name);
    let root_file = forest.get(&root_path).ok_or_else(|| {
        ForestError::CorruptForest(format!("missing root file {}", root_path.display()))
    })?;

    let mut joiner = Joiner {
        registry: &scoped,
        canon: Canonicalizer::new(&scoped),
        records: BTreeMap::new(),
    };
    for object in root_file.elements() {
        joiner.flatten(object, None)?;
    }

    for boundary in &layout.boundaries {
        let path = boundary.relative_path();
        match forest.get(&path) {
            Some(file) => joiner.join_file(boundary, &path, file)?,
            None if boundary.mandatory => {
                return Err(ForestError::CorruptForest(format!(
                    "mandatory file {} is missing",
                    path.display()
                )));
            }
            None => debug!("No {}, nothing owned through {}", path.display(), boundary.property),
        }
    }

    joiner.check_references()?;
    info!("Joined {} objects of {}", joiner.records.len(), project_name);

    Ok(Document {
        root: root_file.emptied(),
        custom_fields,
        records: joiner.records.into_values().collect(),
    })
}

fn strip_keys(block: &Element) -> Element {
    let mut block = block.clone();
    for node in &mut block.children {
        if let Node::Element(field) = node {
            field.remove_attr(KEY_ATTR);
        }
    }
    block
}

struct Joiner<'a> {
    registry: &'a SchemaRegistry,
    canon: Canonicalizer<'a>,
    records: BTreeMap<Guid, Element>,
}

impl Joiner<'_> {
    fn join_file(&mut self, boundary: &Boundary, path: &Path, file: &Element) -> ForestResult<()> {
        let owner = self.owner_of(boundary, path)?;
        match &boundary.header_children {
            Some(children_property) => {
                let header = file.child(HEADER_TAG).ok_or_else(|| {
                    ForestError::CorruptForest(format!("{} has no <{HEADER_TAG}>", path.display()))
                })?;
                let owned = header
                    .elements()
                    .map(|o| self.flatten(o, Some(owner)))
                    .collect::<ForestResult<Vec<_>>>()?;
                let [header_object] = owned[..] else {
                    return Err(ForestError::CorruptForest(format!(
                        "{} holds {} header objects",
                        path.display(),
                        owned.len()
                    )));
                };
                self.attach(owner, &boundary.property, owned)?;

                let records = file
                    .elements()
                    .filter(|e| e.name != HEADER_TAG)
                    .map(|o| self.flatten(o, Some(header_object)))
                    .collect::<ForestResult<Vec<_>>>()?;
                self.attach(header_object, children_property, records)?;
            }
            None => {
                let owned = file
                    .elements()
                    .map(|o| self.flatten(o, Some(owner)))
                    .collect::<ForestResult<Vec<_>>>()?;
                self.attach(owner, &boundary.property, owned)?;
            }
        }
        info!("Joined {}", path.display());
        Ok(())
    }

    /// The single restored object a boundary file belongs to.
    fn owner_of(&self, boundary: &Boundary, path: &Path) -> ForestResult<Guid> {
        let mut owners = Vec::new();
        for (guid, record) in &self.records {
            let class = record.attr("class").unwrap_or_default();
            if self.registry.class_of(class)?.is_a(&boundary.owner_class) {
                owners.push(*guid);
            }
        }
        match owners[..] {
            [owner] => Ok(owner),
            [] => Err(ForestError::MissingOwner {
                owner_class: boundary.owner_class.clone(),
                file: path.display().to_string(),
            }),
            _ => Err(ForestError::CorruptForest(format!(
                "{} {} objects could own {}",
                owners.len(),
                boundary.owner_class,
                path.display()
            ))),
        }
    }

    /// Turns a nested object and everything it owns into flat records.
    fn flatten(&mut self, nested: &Element, owner: Option<Guid>) -> ForestResult<Guid> {
        let class = nested.name.as_str();
        if class == RECORD_TAG {
            return Err(ForestError::CorruptForest(
                "flat record found inside a domain file".to_string(),
            ));
        }
        self.registry.class_of(class)?;
        let text = nested.attr(GUID_ATTR).ok_or_else(|| {
            ForestError::CorruptForest(format!("{class} object has no {GUID_ATTR}"))
        })?;
        let guid = Guid::parse(text)?;
        if self.records.contains_key(&guid) {
            return Err(ForestError::DuplicateIdentifier(guid.to_string()));
        }

        let mut record = Element::new(RECORD_TAG)
            .with_attr("class", class)
            .with_attr(GUID_ATTR, guid.to_string());
        if let Some(owner) = owner {
            record.set_attr(OWNER_ATTR, owner.to_string());
        }
        for (k, v) in &nested.attributes {
            if k != GUID_ATTR && k != "class" && k != OWNER_ATTR {
                record.set_attr(k.as_str(), v.as_str());
            }
        }
        record.attributes.sort_by(|a, b| a.0.cmp(&b.0));

        for node in &nested.children {
            let Node::Element(property) = node else {
                record.children.push(node.clone());
                continue;
            };
            let category = self.canon.property_category(class, property)?;
            if !category.is_owning() {
                record = record.with_child(property.clone());
                continue;
            }
            let mut flat = property.emptied();
            for child in &property.children {
                match child {
                    Node::Element(object) if object.name != OBJSUR_TAG => {
                        let owned = self.flatten(object, Some(guid))?;
                        flat.children
                            .push(Node::Element(objsur(&owned.to_string(), true)));
                    }
                    other => flat.children.push(other.clone()),
                }
            }
            record = record.with_child(flat);
        }

        if self.records.insert(guid, record).is_some() {
            return Err(ForestError::DuplicateIdentifier(guid.to_string()));
        }
        Ok(guid)
    }

    /// Rebuilds an owner's property as markers for `owned`.
    fn attach(&mut self, owner: Guid, property: &str, mut owned: Vec<Guid>) -> ForestResult<()> {
        let class = self
            .records
            .get(&owner)
            .and_then(|r| r.attr("class"))
            .unwrap_or_default()
            .to_string();
        let category = self.registry.property(&class, property)?.category;
        if category.is_collection() {
            owned.sort();
        }
        let markers: Vec<Node> = owned
            .iter()
            .map(|g| Node::Element(objsur(&g.to_string(), true)))
            .collect();

        let Some(record) = self.records.get_mut(&owner) else {
            return Err(ForestError::CorruptForest(format!("owner {owner} vanished")));
        };
        let existing = record
            .children
            .iter_mut()
            .find_map(|n| match n {
                Node::Element(e) if e.name == property => Some(e),
                _ => None,
            });
        match existing {
            Some(element) => element.children = markers,
            None if markers.is_empty() => {}
            None => {
                let at = record
                    .children
                    .iter()
                    .position(|n| matches!(n, Node::Element(e) if property_key(e).as_str() > property))
                    .unwrap_or(record.children.len());
                let mut element = Element::new(property);
                element.children = markers;
                record.children.insert(at, Node::Element(element));
            }
        }
        Ok(())
    }

    /// Every reference marker must point at a restored object.
    fn check_references(&self) -> ForestResult<()> {
        for (guid, record) in &self.records {
            let mut stack: Vec<&Element> = record.elements().collect();
            while let Some(element) = stack.pop() {
                if element.name == OBJSUR_TAG {
                    let target = element.attr(GUID_ATTR).unwrap_or_default();
                    let resolved = Guid::parse(target)
                        .map(|t| self.records.contains_key(&t))
                        .unwrap_or(false);
                    if !resolved {
                        warn!("Dangling reference from {} to {}", guid, target);
                        return Err(ForestError::CorruptForest(format!(
                            "{guid} references missing object {target}"
                        )));
                    }
                }
                stack.extend(element.elements());
            }
        }
        Ok(())
    }
}
