use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::{CustomFieldDecl, SchemaError, SchemaResult};

/// How a property's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    Time,
    GenDate,
    Guid,
    Binary,
    Unicode,
    String,
    MultiUnicode,
    MultiString,
    OwningAtomic,
    OwningCollection,
    OwningSequence,
    ReferenceAtomic,
    ReferenceCollection,
    ReferenceSequence,
}

impl DataType {
    /// Resolves the behavioural category once, so callers match on a tag
    /// instead of comparing type names.
    #[must_use]
    pub const fn category(self) -> PropertyCategory {
        match self {
            Self::OwningAtomic => PropertyCategory::AtomicOwning,
            Self::OwningCollection => PropertyCategory::CollectionOwning,
            Self::OwningSequence => PropertyCategory::SequenceOwning,
            Self::ReferenceAtomic => PropertyCategory::AtomicReference,
            Self::ReferenceCollection => PropertyCategory::CollectionReference,
            Self::ReferenceSequence => PropertyCategory::SequenceReference,
            Self::MultiUnicode | Self::MultiString => PropertyCategory::MultiAlternative,
            Self::Boolean
            | Self::Integer
            | Self::Time
            | Self::GenDate
            | Self::Guid
            | Self::Binary
            | Self::Unicode
            | Self::String => PropertyCategory::Scalar,
        }
    }

    /// Name used in custom field declarations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Time => "Time",
            Self::GenDate => "GenDate",
            Self::Guid => "Guid",
            Self::Binary => "Binary",
            Self::Unicode => "Unicode",
            Self::String => "String",
            Self::MultiUnicode => "MultiUnicode",
            Self::MultiString => "MultiString",
            Self::OwningAtomic => "OwningAtomic",
            Self::OwningCollection => "OwningCollection",
            Self::OwningSequence => "OwningSequence",
            Self::ReferenceAtomic => "ReferenceAtomic",
            Self::ReferenceCollection => "ReferenceCollection",
            Self::ReferenceSequence => "ReferenceSequence",
        }
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Boolean" => Self::Boolean,
            "Integer" => Self::Integer,
            "Time" => Self::Time,
            "GenDate" => Self::GenDate,
            "Guid" => Self::Guid,
            "Binary" => Self::Binary,
            "Unicode" => Self::Unicode,
            "String" => Self::String,
            "MultiUnicode" => Self::MultiUnicode,
            "MultiString" => Self::MultiString,
            "OwningAtomic" => Self::OwningAtomic,
            "OwningCollection" => Self::OwningCollection,
            "OwningSequence" => Self::OwningSequence,
            "ReferenceAtomic" => Self::ReferenceAtomic,
            "ReferenceCollection" => Self::ReferenceCollection,
            "ReferenceSequence" => Self::ReferenceSequence,
            other => return Err(SchemaError::UnknownDataType(other.to_string())),
        })
    }
}

/// Behaviour-relevant category of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    /// Opaque leaf value.
    Scalar,
    /// Owns at most one object.
    AtomicOwning,
    /// Owns an ordered list of objects.
    SequenceOwning,
    /// Owns an unordered set of objects.
    CollectionOwning,
    /// Points at one object owned elsewhere.
    AtomicReference,
    /// Unordered set of pointers.
    CollectionReference,
    /// Ordered list of pointers.
    SequenceReference,
    /// Text alternatives keyed by writing system.
    MultiAlternative,
}

impl PropertyCategory {
    #[must_use]
    pub const fn is_owning(self) -> bool {
        matches!(
            self,
            Self::AtomicOwning | Self::SequenceOwning | Self::CollectionOwning
        )
    }

    /// True for unordered containers, whose children are sorted by identifier.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::CollectionOwning | Self::CollectionReference)
    }

    /// True for ordered containers, whose authored order is significant.
    #[must_use]
    pub const fn is_sequence(self) -> bool {
        matches!(self, Self::SequenceOwning | Self::SequenceReference)
    }

    #[must_use]
    pub const fn is_multi_alternative(self) -> bool {
        matches!(self, Self::MultiAlternative)
    }

    /// True when the property holds child objects or markers identified by guid.
    #[must_use]
    pub const fn has_identified_children(self) -> bool {
        self.is_owning() || self.is_collection() || self.is_sequence()
    }
}

/// One property of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub data_type: DataType,
    pub category: PropertyCategory,
    /// Declared by the project rather than the built-in model.
    #[serde(default)]
    pub custom: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            category: data_type.category(),
            custom: false,
        }
    }

    pub fn custom(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            custom: true,
            ..Self::new(name, data_type)
        }
    }
}

/// Static definition of a class, before inheritance is resolved.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: &'static str,
    pub superclass: Option<&'static str>,
    pub properties: Vec<(&'static str, DataType)>,
}

/// A class with its full property set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<String>,
    /// This class followed by its ancestors.
    pub lineage: Vec<String>,
    properties: BTreeMap<String, PropertyInfo>,
}

impl ClassInfo {
    /// All properties, inherited ones included, ordered by name.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyInfo)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a declared (non-custom) property.
    pub fn property(&self, name: &str) -> SchemaResult<&PropertyInfo> {
        self.properties
            .get(name)
            .ok_or_else(|| SchemaError::UnknownProperty {
                class: self.name.clone(),
                property: name.to_string(),
            })
    }

    /// True when this class is `ancestor` or derives from it.
    pub fn is_a(&self, ancestor: &str) -> bool {
        self.lineage.iter().any(|c| c == ancestor)
    }
}

/// Read-only registry of classes, optionally extended with the custom
/// properties one project declares.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    classes: BTreeMap<String, ClassInfo>,
    /// Keyed by (class, property name).
    custom: BTreeMap<(String, String), PropertyInfo>,
}

impl SchemaRegistry {
    /// Builds a registry, flattening superclass chains.
    ///
    /// Definitions may appear in any order; an unknown superclass is an error.
    pub fn from_definitions(defs: Vec<ClassDef>) -> SchemaResult<Self> {
        for def in &defs {
            if let Some(superclass) = def.superclass {
                if !defs.iter().any(|d| d.name == superclass) {
                    return Err(SchemaError::UnknownClass(superclass.to_string()));
                }
            }
        }
        Ok(Self::resolve(&defs))
    }

    /// Flattens definitions whose superclasses are all present.
    pub(crate) fn resolve(defs: &[ClassDef]) -> Self {
        let by_name: BTreeMap<&str, &ClassDef> = defs.iter().map(|d| (d.name, d)).collect();
        let mut classes = BTreeMap::new();

        for def in defs {
            let mut lineage: Vec<String> = Vec::new();
            let mut properties = BTreeMap::new();
            let mut current = by_name.get(def.name).copied();
            while let Some(class) = current {
                if lineage.iter().any(|c| c == class.name) {
                    break;
                }
                lineage.push(class.name.to_string());
                for (prop, data_type) in &class.properties {
                    properties
                        .entry((*prop).to_string())
                        .or_insert_with(|| PropertyInfo::new(*prop, *data_type));
                }
                current = class.superclass.and_then(|s| by_name.get(s).copied());
            }
            classes.insert(
                def.name.to_string(),
                ClassInfo {
                    name: def.name.to_string(),
                    superclass: def.superclass.map(str::to_string),
                    lineage,
                    properties,
                },
            );
        }

        Self {
            classes,
            custom: BTreeMap::new(),
        }
    }

    /// Returns a class by name.
    pub fn class_of(&self, name: &str) -> SchemaResult<&ClassInfo> {
        self.classes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))
    }

    /// Returns true when the class is known.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Iterates over all class names in order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Looks up an ordinary property of a class.
    pub fn property(&self, class: &str, property: &str) -> SchemaResult<&PropertyInfo> {
        self.class_of(class)?.property(property)
    }

    /// Looks up a custom property declared on a class or one of its ancestors.
    pub fn custom_property(&self, class: &str, name: &str) -> SchemaResult<&PropertyInfo> {
        let info = self.class_of(class)?;
        info.lineage
            .iter()
            .find_map(|c| self.custom.get(&(c.clone(), name.to_string())))
            .ok_or_else(|| SchemaError::UnknownProperty {
                class: class.to_string(),
                property: name.to_string(),
            })
    }

    /// Returns a pass-scoped registry that also knows the given custom fields.
    pub fn with_custom_fields(&self, decls: &[CustomFieldDecl]) -> SchemaResult<Self> {
        let mut extended = self.clone();
        for decl in decls {
            if !extended.contains(&decl.class) {
                return Err(SchemaError::InvalidCustomField(format!(
                    "{} declared on unknown class {}",
                    decl.name, decl.class
                )));
            }
            extended.custom.insert(
                (decl.class.clone(), decl.name.clone()),
                PropertyInfo::custom(decl.name.clone(), decl.data_type),
            );
        }
        Ok(extended)
    }

    /// Number of custom properties known to this registry.
    pub fn custom_field_count(&self) -> usize {
        self.custom.len()
    }
}
