//! Annotation classes and the per-session class catalog.

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};
use crate::model::ClassId;

/// How instances of a class are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingPolicy {
    /// A single implicit instance per frame (object id is always 0).
    Uniform,
    /// Any number of instances, each with its own object id.
    MultiInstance,
}

impl EncodingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            EncodingPolicy::Uniform => "Uniform",
            EncodingPolicy::MultiInstance => "Multiple objects",
        }
    }
}

/// Inclusive color range used to encode object identities on export.
///
/// Uniform classes only use `min`. The range is trusted to be
/// non-decreasing per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentityRange {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

impl IdentityRange {
    pub fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// A range holding a single color.
    pub fn single(color: [u8; 3]) -> Self {
        Self::new(color, color)
    }
}

/// Definition of one annotation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProperty {
    /// Display name of the class
    pub name: String,
    /// Instance encoding policy
    pub encoding: EncodingPolicy,
    /// RGB color used to draw the class
    pub display_color: [u8; 3],
    /// Identity colors used by the export
    pub identity_range: IdentityRange,
}

impl ClassProperty {
    /// Create a uniform class whose identity color is `identity`.
    pub fn uniform(name: &str, display_color: [u8; 3], identity: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            encoding: EncodingPolicy::Uniform,
            display_color,
            identity_range: IdentityRange::single(identity),
        }
    }

    /// Create a multi-instance class encoding ids within `[min, max]`.
    pub fn multi_instance(
        name: &str,
        display_color: [u8; 3],
        min: [u8; 3],
        max: [u8; 3],
    ) -> Self {
        Self {
            name: name.to_string(),
            encoding: EncodingPolicy::MultiInstance,
            display_color,
            identity_range: IdentityRange::new(min, max),
        }
    }

    pub fn is_multi_instance(&self) -> bool {
        self.encoding == EncodingPolicy::MultiInstance
    }
}

/// Classes available for a session, numbered from 1 in insertion order.
///
/// The catalog is append-only: once handed out, a class id stays valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCatalog {
    classes: Vec<ClassProperty>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The road/vehicle classes a fresh configuration starts with.
    pub fn with_default_classes() -> Self {
        let mut catalog = Self::new();
        for class in default_classes() {
            catalog.add_class(class);
        }
        catalog
    }

    /// Register a class and return its id.
    pub fn add_class(&mut self, property: ClassProperty) -> ClassId {
        self.classes.push(property);
        // Plane storage is i16; saturate instead of wrapping for absurd catalogs
        ClassId::try_from(self.classes.len()).unwrap_or(ClassId::MAX)
    }

    /// Look up a class by id.
    pub fn get(&self, class_id: ClassId) -> Result<&ClassProperty> {
        usize::try_from(class_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.classes.get(index))
            .ok_or(AnnotationError::ClassOutOfRange {
                class_id,
                count: self.classes.len(),
            })
    }

    pub fn contains(&self, class_id: ClassId) -> bool {
        self.get(class_id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over `(class_id, property)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassProperty)> + '_ {
        (1..).zip(self.classes.iter())
    }
}

impl FromIterator<ClassProperty> for ClassCatalog {
    fn from_iter<I: IntoIterator<Item = ClassProperty>>(iter: I) -> Self {
        Self {
            classes: iter.into_iter().collect(),
        }
    }
}

/// Default classes for new sessions.
pub fn default_classes() -> Vec<ClassProperty> {
    vec![
        ClassProperty::uniform("Road", [0, 85, 85], [127, 127, 0]),
        ClassProperty::multi_instance("Car", [255, 0, 0], [0, 0, 255], [3, 3, 255]),
        ClassProperty::multi_instance("Truck", [170, 0, 0], [170, 0, 0], [175, 57, 255]),
        ClassProperty::multi_instance("Bus", [85, 0, 0], [85, 0, 0], [85, 255, 255]),
    ]
}
