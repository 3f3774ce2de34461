use std::collections::BTreeMap;

use lexbridge_canon::{identifier_key, Canonicalizer, CanonError, GUID_ATTR};
use lexbridge_forest::HEADER_TAG;
use lexbridge_schema::SchemaRegistry;
use lexbridge_types::{parse_element, write_element, Element, Node};
use tracing::debug;

use crate::premerge::{canonicalize_unit, prepare};
use crate::structural::Merger;
use crate::{ConflictPolicy, MergeError, MergeEventListener, MergeResult};

/// Progress of a single unit through the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    Start,
    PreMerge,
    StructuralMerge,
    Done,
}

/// Three-way merger for domain file content.
///
/// The registry must already carry the project's custom fields.
#[derive(Debug, Clone, Copy)]
pub struct MergeEngine<'a> {
    registry: &'a SchemaRegistry,
    policy: ConflictPolicy,
}

impl<'a> MergeEngine<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            policy: ConflictPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    fn merger<'l>(&self, listener: &'l mut dyn MergeEventListener) -> Merger<'a, 'l> {
        Merger {
            canon: Canonicalizer::new(self.registry),
            policy: self.policy,
            listener,
        }
    }

    /// Merges one object record or a `header` block.
    ///
    /// `common` is the common ancestor, absent when both sides created the
    /// unit independently. Conflicts never fail the merge; they are reported
    /// to `listener` and resolved.
    pub fn merge_unit(
        &self,
        listener: &mut dyn MergeEventListener,
        ours: &Element,
        theirs: &Element,
        common: Option<&Element>,
    ) -> MergeResult<Element> {
        let unit = unit_label(ours);
        let mut stage = MergeStage::Start;
        debug!("{} at {:?}", unit, stage);

        if ours.name != theirs.name || identifier_key(ours) != identifier_key(theirs) {
            return Err(MergeError::MismatchedUnits {
                ours: unit,
                theirs: unit_label(theirs),
            });
        }

        stage = advance(&unit, stage, MergeStage::PreMerge);
        let canon = Canonicalizer::new(self.registry);
        let prepared = prepare(&canon, ours, theirs, common)?;

        stage = advance(&unit, stage, MergeStage::StructuralMerge);
        let mut merger = self.merger(listener);
        let merged = if prepared.ours.name == HEADER_TAG {
            merge_header(&mut merger, &prepared.ours, &prepared.theirs, prepared.ancestor.as_ref())?
        } else {
            merger.merge_object("", &prepared.ours, &prepared.theirs, prepared.ancestor.as_ref())?
        };

        advance(&unit, stage, MergeStage::Done);
        canonicalize_unit(&canon, &merged)
    }

    /// Merges serialized units. An empty `common` means no ancestor.
    pub fn merge_fragments(
        &self,
        listener: &mut dyn MergeEventListener,
        ours: &str,
        theirs: &str,
        common: &str,
    ) -> MergeResult<String> {
        let ours = parse_element(ours)?;
        let theirs = parse_element(theirs)?;
        let common = if common.trim().is_empty() {
            None
        } else {
            Some(parse_element(common)?)
        };
        let merged = self.merge_unit(listener, &ours, &theirs, common.as_ref())?;
        Ok(write_element(&merged))
    }

    /// Merges whole domain files: the optional header, then every top-level
    /// record paired by identifier.
    ///
    /// Files whose records are all in identifier order stay that way;
    /// otherwise the order is merged like a sequence.
    pub fn merge_file(
        &self,
        listener: &mut dyn MergeEventListener,
        ours: &Element,
        theirs: &Element,
        common: Option<&Element>,
    ) -> MergeResult<Element> {
        let file = ours.name.clone();
        debug!("Merging file <{}>", file);

        let mut out = ours.emptied();
        out.attributes = self
            .merger(&mut *listener)
            .merge_attributes(&file, ours, theirs, common);

        let oh = ours.child(HEADER_TAG);
        let th = theirs.child(HEADER_TAG);
        let ah = common.and_then(|c| c.child(HEADER_TAG));
        let merged_header = match (oh, th) {
            (Some(o), Some(t)) => Some(self.merge_unit(&mut *listener, o, t, ah)?),
            _ => self.merge_absent(&mut *listener, &file, oh, th, ah)?,
        };
        if let Some(h) = merged_header {
            out.children.push(Node::Element(h));
        }

        let (o, t, a) = (records(Some(ours))?, records(Some(theirs))?, records(common)?);
        let mut keys: Vec<&String> = Vec::new();
        for k in o.keys().chain(t.keys()).chain(a.keys()) {
            if !keys.contains(&k) {
                keys.push(k);
            }
        }

        let mut merged = BTreeMap::new();
        for key in keys {
            let (om, tm, am) = (o.get(key).copied(), t.get(key).copied(), a.get(key).copied());
            let result = match (om, tm) {
                (Some(x), Some(y)) => Some(self.merge_unit(&mut *listener, x, y, am)?),
                _ => self.merge_absent(&mut *listener, &file, om, tm, am)?,
            };
            if let Some(record) = result {
                merged.insert(key.clone(), record);
            }
        }

        let sorted = [Some(ours), Some(theirs), common]
            .into_iter()
            .flatten()
            .all(records_sorted);
        let order: Vec<String> = if sorted {
            merged.keys().cloned().collect()
        } else {
            let order_of = |e: Option<&Element>| -> Vec<String> {
                e.map(|e| record_elements(e).filter_map(identifier_key).collect())
                    .unwrap_or_default()
            };
            self.merger(&mut *listener).order_sequence(
                &file,
                &order_of(Some(ours)),
                &order_of(Some(theirs)),
                &order_of(common),
                &merged,
            )
        };
        for key in order {
            if let Some(record) = merged.remove(&key) {
                out.children.push(Node::Element(record));
            }
        }
        Ok(out)
    }

    /// Unit present on at most one side: canonicalize what exists and apply
    /// the presence rules.
    fn merge_absent(
        &self,
        listener: &mut dyn MergeEventListener,
        path: &str,
        ours: Option<&Element>,
        theirs: Option<&Element>,
        common: Option<&Element>,
    ) -> MergeResult<Option<Element>> {
        let canon = Canonicalizer::new(self.registry);
        let canonical = |e: Option<&Element>| e.map(|e| canonicalize_unit(&canon, e)).transpose();
        let (o, t, a) = (canonical(ours)?, canonical(theirs)?, canonical(common)?);
        let label = o.as_ref().or(t.as_ref()).or(a.as_ref()).map(unit_label).unwrap_or_default();
        let path = format!("{path}/{label}");
        Ok(self
            .merger(listener)
            .three_way(&path, o.as_ref(), t.as_ref(), a.as_ref()))
    }
}

fn advance(unit: &str, from: MergeStage, to: MergeStage) -> MergeStage {
    debug!("{} {:?} -> {:?}", unit, from, to);
    to
}

fn unit_label(unit: &Element) -> String {
    let class = unit.attr("class").unwrap_or(&unit.name);
    match identifier_key(unit) {
        Some(guid) => format!("{class}[{guid}]"),
        None => class.to_string(),
    }
}

/// Header children are paired by element name.
fn merge_header(
    merger: &mut Merger<'_, '_>,
    ours: &Element,
    theirs: &Element,
    ancestor: Option<&Element>,
) -> MergeResult<Element> {
    let mut names: Vec<&str> = Vec::new();
    for e in ours
        .elements()
        .chain(theirs.elements())
        .chain(ancestor.into_iter().flat_map(Element::elements))
    {
        if !names.contains(&e.name.as_str()) {
            names.push(&e.name);
        }
    }

    let mut out = ours.emptied();
    for name in names {
        let (o, t) = (ours.child(name), theirs.child(name));
        let a = ancestor.and_then(|a| a.child(name));
        let merged = match (o, t) {
            (Some(o), Some(t)) => Some(merger.merge_object(HEADER_TAG, o, t, a)?),
            _ => merger.three_way(&format!("{HEADER_TAG}/{name}"), o, t, a),
        };
        if let Some(child) = merged {
            out.children.push(Node::Element(child));
        }
    }
    Ok(out)
}

fn record_elements(file: &Element) -> impl Iterator<Item = &Element> {
    file.elements().filter(|e| e.name != HEADER_TAG)
}

fn records(file: Option<&Element>) -> MergeResult<BTreeMap<String, &Element>> {
    let mut map = BTreeMap::new();
    let Some(file) = file else {
        return Ok(map);
    };
    for record in record_elements(file) {
        let key = identifier_key(record).ok_or_else(|| CanonError::MissingAttribute {
            element: record.name.clone(),
            attribute: GUID_ATTR.to_string(),
        })?;
        map.insert(key, record);
    }
    Ok(map)
}

fn records_sorted(file: &Element) -> bool {
    let keys: Vec<String> = record_elements(file).filter_map(identifier_key).collect();
    keys.windows(2).all(|w| w[0] <= w[1])
}
