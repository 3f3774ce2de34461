//! Preparation applied to every unit before the structural merge.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use lexbridge_canon::{identifier_key, Canonicalizer, OBJSUR_TAG};
use lexbridge_forest::HEADER_TAG;
use lexbridge_types::{Element, Node};

use crate::MergeResult;

/// Bookkeeping time stamp reconciled before merging.
pub const DATE_MODIFIED: &str = "DateModified";

/// `yyyy-M-d H:m:s.fff`; padding and fraction are optional when parsing.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A unit ready for the structural merge.
pub(crate) struct Prepared {
    pub ours: Element,
    pub theirs: Element,
    pub ancestor: Option<Element>,
}

/// Canonicalizes the three versions of a unit and reconciles time stamps.
pub(crate) fn prepare(
    canon: &Canonicalizer<'_>,
    ours: &Element,
    theirs: &Element,
    ancestor: Option<&Element>,
) -> MergeResult<Prepared> {
    let mut ours = canonicalize_unit(canon, ours)?;
    let mut theirs = canonicalize_unit(canon, theirs)?;
    let ancestor = ancestor.map(|a| canonicalize_unit(canon, a)).transpose()?;
    reconcile_dates(&mut ours, &mut theirs, ancestor.as_ref());
    Ok(Prepared {
        ours,
        theirs,
        ancestor,
    })
}

/// Canonical form of an object, or of each object inside a header.
pub(crate) fn canonicalize_unit(canon: &Canonicalizer<'_>, unit: &Element) -> MergeResult<Element> {
    if unit.name == HEADER_TAG {
        let children = unit
            .elements()
            .map(|c| canon.canonicalize_object(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(unit.emptied().with_children(children))
    } else {
        Ok(canon.canonicalize_object(unit)?)
    }
}

/// When both sides touched an object's `DateModified`, both take the later
/// value, so the stamp never conflicts.
pub(crate) fn reconcile_dates(ours: &mut Element, theirs: &mut Element, ancestor: Option<&Element>) {
    let later = {
        let theirs_index = object_index(theirs);
        let ancestor_index = ancestor.map(object_index).unwrap_or_default();
        let mut later = BTreeMap::new();
        for (guid, o) in object_index(ours) {
            let Some(t) = theirs_index.get(&guid) else {
                continue;
            };
            let (Some(od), Some(td)) = (o.child(DATE_MODIFIED), t.child(DATE_MODIFIED)) else {
                continue;
            };
            let ad = ancestor_index.get(&guid).and_then(|a| a.child(DATE_MODIFIED));
            if od == td || Some(od) == ad || Some(td) == ad {
                continue;
            }
            if let (Some(ot), Some(tt)) = (parse_time(od), parse_time(td)) {
                let winner = if tt > ot { td } else { od };
                later.insert(guid, winner.clone());
            }
        }
        later
    };
    if !later.is_empty() {
        apply_dates(ours, &later);
        apply_dates(theirs, &later);
    }
}

fn parse_time(property: &Element) -> Option<NaiveDateTime> {
    let value = property.attr("val")?;
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

fn is_object(element: &Element) -> bool {
    element.name != OBJSUR_TAG && identifier_key(element).is_some()
}

/// Every object in a tree by identifier, the root included.
fn object_index(root: &Element) -> BTreeMap<String, &Element> {
    let mut index = BTreeMap::new();
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        if is_object(element) {
            if let Some(key) = identifier_key(element) {
                index.insert(key, element);
            }
        }
        stack.extend(element.elements());
    }
    index
}

fn apply_dates(element: &mut Element, later: &BTreeMap<String, Element>) {
    let stamp = if is_object(element) {
        identifier_key(element).and_then(|k| later.get(&k))
    } else {
        None
    };
    for node in &mut element.children {
        if let Node::Element(child) = node {
            match stamp {
                Some(stamp) if child.name == DATE_MODIFIED => *child = stamp.clone(),
                _ => apply_dates(child, later),
            }
        }
    }
}
