//! Custom (project-declared) properties.
//!
//! ```xml
//! <AdditionalFields>
//!   <CustomField class="WfiWordform" name="Certified" type="Boolean" />
//! </AdditionalFields>
//! ```
//!
//! Values appear inside objects as `<Custom name="Certified" val="True" />`.

use lexbridge_types::Element;
use serde::{Deserialize, Serialize};

use crate::{DataType, SchemaError, SchemaResult};

/// Tag of one declaration inside the `AdditionalFields` block.
pub const CUSTOM_FIELD_TAG: &str = "CustomField";

/// Tag of a custom property value inside an object.
pub const CUSTOM_PROPERTY_TAG: &str = "Custom";

/// A dynamically declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldDecl {
    pub class: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl CustomFieldDecl {
    /// Compound sort key: class name followed by property name.
    pub fn key(&self) -> String {
        format!("{}{}", self.class, self.name)
    }

    /// Reads one `<CustomField>` element.
    pub fn from_element(element: &Element) -> SchemaResult<Self> {
        let get = |attr: &str| {
            element.attr(attr).map(str::to_string).ok_or_else(|| {
                SchemaError::InvalidCustomField(format!("missing '{attr}' attribute"))
            })
        };
        Ok(Self {
            class: get("class")?,
            name: get("name")?,
            data_type: get("type")?.parse()?,
        })
    }

    /// Reads every declaration of an `AdditionalFields` block.
    pub fn parse_block(block: &Element) -> SchemaResult<Vec<Self>> {
        block
            .elements()
            .filter(|e| e.name == CUSTOM_FIELD_TAG)
            .map(Self::from_element)
            .collect()
    }
}
