use lexbridge_schema::CUSTOM_FIELD_TAG;
use lexbridge_types::Element;

use crate::attributes::sort_attributes;
use crate::{CanonError, CanonResult};

/// Derived sort key attribute on custom field declarations.
pub const KEY_ATTR: &str = "key";

/// Whether canonical custom field declarations carry the derived `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAttribute {
    /// Add `key = class + name` (decomposed files, where mergers pair on it).
    Attach,
    /// Remove it (the monolithic document).
    Strip,
}

/// Orders custom field declarations by `class + name` and sorts attributes.
pub fn canonicalize_custom_fields(block: &Element, key: KeyAttribute) -> CanonResult<Element> {
    let mut fields = Vec::new();
    for field in block.elements() {
        let mut field = field.clone();
        field.remove_attr(KEY_ATTR);
        let sort_key = if field.name == CUSTOM_FIELD_TAG {
            let compound = format!(
                "{}{}",
                required(&field, "class")?,
                required(&field, "name")?
            );
            if key == KeyAttribute::Attach {
                field.set_attr(KEY_ATTR, compound.clone());
            }
            compound
        } else {
            String::new()
        };
        fields.push((sort_key, sort_attributes(&field)));
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(sort_attributes(&block.emptied()).with_children(fields.into_iter().map(|(_, f)| f)))
}

fn required<'e>(field: &'e Element, attribute: &str) -> CanonResult<&'e str> {
    field.attr(attribute).ok_or_else(|| CanonError::MissingAttribute {
        element: CUSTOM_FIELD_TAG.to_string(),
        attribute: attribute.to_string(),
    })
}
