//! Decomposition: monolithic document → file forest.

use std::collections::BTreeMap;

use lexbridge_canon::{
    canonicalize_custom_fields, class_name, identifier_key, sort_attributes, Canonicalizer,
    KeyAttribute, GUID_ATTR, OBJSUR_TAG, OWNER_ATTR,
};
use lexbridge_schema::{CustomFieldDecl, PropertyCategory, SchemaRegistry, CUSTOM_PROPERTY_TAG};
use lexbridge_types::{Document, Element, Guid, Node};
use tracing::{debug, info};

use crate::layout::{Boundary, HEADER_TAG};
use crate::{DomainLayout, FileForest, ForestError, ForestResult, IdentifierIndex};

const CLASS_ATTR: &str = "class";

/// Output of [`split`].
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub forest: FileForest,
    pub index: IdentifierIndex,
}

/// Splits a monolithic document into domain files.
///
/// Every object ends up nested under its owner, either in the root file or
/// in the file of the nearest boundary above it. Records that cannot be
/// reached from a root object are an error.
pub fn split(
    document: &Document,
    registry: &SchemaRegistry,
    layout: &DomainLayout,
    project_name: &str,
) -> ForestResult<Decomposition> {
    layout.validate(registry)?;
    let decls = match &document.custom_fields {
        Some(block) => CustomFieldDecl::parse_block(block)?,
        None => Vec::new(),
    };
    let scoped = registry.with_custom_fields(&decls)?;

    let mut index = IdentifierIndex::new();
    let mut pool = BTreeMap::new();
    for record in &document.records {
        let class = class_name(record)?;
        scoped.class_of(class)?;
        let guid = record_guid(record, class)?;
        index.insert(guid, class)?;
        pool.insert(guid, record.clone());
    }

    let roots: Vec<Guid> = pool
        .iter()
        .filter(|(_, r)| r.attr(OWNER_ATTR).is_none())
        .map(|(g, _)| *g)
        .collect();

    let mut splitter = Splitter {
        registry: &scoped,
        canon: Canonicalizer::new(&scoped),
        layout,
        pool,
        forest: FileForest::new(),
    };

    let mut nested_roots = Vec::with_capacity(roots.len());
    for guid in &roots {
        let object = splitter.nest(guid, None)?;
        nested_roots.push(splitter.canon.canonicalize_object(&object)?);
    }

    if let Some(orphan) = splitter.pool.keys().next() {
        return Err(ForestError::CorruptForest(format!(
            "{} record(s) unreachable from any root object, first {orphan}",
            splitter.pool.len()
        )));
    }

    let mut forest = splitter.forest;
    forest.insert(
        DomainLayout::root_path(project_name),
        sort_attributes(&document.root.emptied()).with_children(nested_roots),
    );
    if let Some(block) = &document.custom_fields {
        forest.insert(
            DomainLayout::custom_properties_path(project_name),
            canonicalize_custom_fields(block, KeyAttribute::Attach)?,
        );
    }

    info!(
        "Split {} objects of {} into {} files",
        index.len(),
        project_name,
        forest.len()
    );
    Ok(Decomposition { forest, index })
}

fn record_guid(record: &Element, class: &str) -> ForestResult<Guid> {
    let text = record.attr(GUID_ATTR).ok_or_else(|| {
        ForestError::CorruptForest(format!("{class} record has no {GUID_ATTR}"))
    })?;
    Ok(Guid::parse(text)?)
}

fn marker_target(marker: &Element) -> ForestResult<Guid> {
    let text = marker.attr(GUID_ATTR).ok_or_else(|| {
        ForestError::CorruptForest(format!("<{OBJSUR_TAG}> without {GUID_ATTR}"))
    })?;
    Ok(Guid::parse(text)?)
}

/// Orders canonical top-level objects of a domain file.
fn order_objects(mut objects: Vec<Element>, category: PropertyCategory) -> Vec<Element> {
    if category.is_collection() {
        objects.sort_by_cached_key(|o| identifier_key(o).unwrap_or_default());
    }
    objects
}

struct Splitter<'a> {
    registry: &'a SchemaRegistry,
    canon: Canonicalizer<'a>,
    layout: &'a DomainLayout,
    pool: BTreeMap<Guid, Element>,
    forest: FileForest,
}

impl Splitter<'_> {
    /// Takes a record out of the pool and returns it in nested form.
    fn nest(&mut self, guid: &Guid, owner: Option<&Guid>) -> ForestResult<Element> {
        let record = self.pool.remove(guid).ok_or_else(|| {
            ForestError::CorruptForest(format!("owning marker targets missing object {guid}"))
        })?;

        if let Some(owner) = owner {
            let recorded = record.attr(OWNER_ATTR).map(Guid::parse).transpose()?;
            if recorded.as_ref() != Some(owner) {
                return Err(ForestError::CorruptForest(format!(
                    "{guid} is owned by {owner} but names a different owner"
                )));
            }
        }

        let class = class_name(&record)?.to_string();
        let mut nested = Element::new(class.as_str());
        nested.attributes = record
            .attributes
            .iter()
            .filter(|(k, _)| k != CLASS_ATTR && k != OWNER_ATTR)
            .cloned()
            .collect();

        for node in record.children {
            match node {
                Node::Element(property) => {
                    let property = self.nest_property(&class, guid, property)?;
                    nested.children.push(Node::Element(property));
                }
                text => nested.children.push(text),
            }
        }
        Ok(nested)
    }

    fn nest_property(&mut self, class: &str, owner: &Guid, property: Element) -> ForestResult<Element> {
        let category = self.canon.property_category(class, &property)?;
        if !category.is_owning() {
            return Ok(property);
        }

        if property.name != CUSTOM_PROPERTY_TAG {
            let layout = self.layout;
            if let Some(boundary) = layout.boundary_for(self.registry, class, &property.name)? {
                self.extract(boundary, category, owner, &property)?;
                return Ok(property.emptied());
            }
        }

        let mut out = property.emptied();
        for node in property.children {
            match node {
                Node::Element(marker) if marker.name == OBJSUR_TAG => {
                    let target = marker_target(&marker)?;
                    out.children.push(Node::Element(self.nest(&target, Some(owner))?));
                }
                other => out.children.push(other),
            }
        }
        Ok(out)
    }

    /// Moves the objects owned through a boundary property into their file.
    fn extract(
        &mut self,
        boundary: &Boundary,
        category: PropertyCategory,
        owner: &Guid,
        property: &Element,
    ) -> ForestResult<()> {
        let path = boundary.relative_path();
        let targets = property
            .elements()
            .filter(|e| e.name == OBJSUR_TAG)
            .map(marker_target)
            .collect::<ForestResult<Vec<_>>>()?;
        if targets.is_empty() {
            debug!("Nothing owned through {}, skipping {}", boundary.property, path.display());
            return Ok(());
        }

        let mut root = Element::new(boundary.root_tag.as_str());
        match &boundary.header_children {
            Some(children_property) => {
                let [target] = targets[..] else {
                    return Err(ForestError::CorruptForest(format!(
                        "{} owns {} objects through a header boundary",
                        owner,
                        targets.len()
                    )));
                };
                let object = self.nest(&target, Some(owner))?;
                let (header, records, records_category) = self.detach(object, children_property)?;
                root = root.with_child(
                    Element::new(HEADER_TAG).with_child(self.canon.canonicalize_object(&header)?),
                );
                let records = records
                    .iter()
                    .map(|r| self.canon.canonicalize_object(r))
                    .collect::<Result<Vec<_>, _>>()?;
                root = root.with_children(order_objects(records, records_category));
            }
            None => {
                let mut objects = Vec::with_capacity(targets.len());
                for target in &targets {
                    let object = self.nest(target, Some(owner))?;
                    objects.push(self.canon.canonicalize_object(&object)?);
                }
                root = root.with_children(order_objects(objects, category));
            }
        }

        debug!("Split {} objects into {}", targets.len(), path.display());
        if self.forest.insert(path.clone(), root).is_some() {
            return Err(ForestError::CorruptForest(format!(
                "{} is reached more than once",
                path.display()
            )));
        }
        Ok(())
    }

    /// Empties `property` on a nested object and returns its children.
    fn detach(
        &self,
        mut object: Element,
        property: &str,
    ) -> ForestResult<(Element, Vec<Element>, PropertyCategory)> {
        let mut records = Vec::new();
        let mut category = PropertyCategory::CollectionOwning;
        for node in &mut object.children {
            if let Node::Element(p) = node {
                if p.name == property {
                    category = self.canon.property_category(&object.name, p)?;
                    let emptied = p.emptied();
                    let full = std::mem::replace(p, emptied);
                    records.extend(full.into_elements());
                }
            }
        }
        Ok((object, records, category))
    }
}
