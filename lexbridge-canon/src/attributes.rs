use lexbridge_types::{guid_key, Element, Node};

use crate::{GUID_ATTR, OWNER_ATTR};

/// Sorts attributes by name at every level.
///
/// Elements with fewer than two attributes are left alone.
pub fn sort_attributes(element: &Element) -> Element {
    let mut attributes = element.attributes.clone();
    if attributes.len() > 1 {
        attributes.sort_by(|a, b| a.0.cmp(&b.0));
    }
    Element {
        name: element.name.clone(),
        attributes,
        children: element
            .children
            .iter()
            .map(|n| match n {
                Node::Element(e) => Node::Element(sort_attributes(e)),
                Node::Text(t) => Node::Text(t.clone()),
            })
            .collect(),
    }
}

/// Lower-cases `guid` and `ownerguid` values on this element only.
pub fn normalize_identifiers(element: &mut Element) {
    for (key, value) in &mut element.attributes {
        if key == GUID_ATTR || key == OWNER_ATTR {
            *value = guid_key(value);
        }
    }
}
