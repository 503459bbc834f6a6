//! Attribute kinds: Property, Relationship and GeoProperty.
//!
//! Each kind has a fixed discriminator, a kind-specific mandatory field and
//! the same set of optional fields. Any attribute may carry nested
//! properties and relationships through its [`Attributes`] container.

use crate::attributes::Attributes;
use crate::geometry::Geometry;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Discriminator of a Property.
pub const PROPERTY: &str = "Property";
/// Discriminator of a Relationship.
pub const RELATIONSHIP: &str = "Relationship";
/// Discriminator of a GeoProperty.
pub const GEO_PROPERTY: &str = "GeoProperty";

/// The three attribute kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Holds an arbitrary JSON value
    Property,
    /// Points to another entity
    Relationship,
    /// Holds a geometry
    GeoProperty,
}

impl AttributeKind {
    /// The literal `type` string emitted for this kind.
    #[must_use]
    pub const fn discriminator(self) -> &'static str {
        match self {
            AttributeKind::Property => PROPERTY,
            AttributeKind::Relationship => RELATIONSHIP,
            AttributeKind::GeoProperty => GEO_PROPERTY,
        }
    }

    /// Parse a discriminator. Matching is exact and case sensitive.
    #[must_use]
    pub fn from_discriminator(s: &str) -> Option<Self> {
        match s {
            PROPERTY => Some(AttributeKind::Property),
            RELATIONSHIP => Some(AttributeKind::Relationship),
            GEO_PROPERTY => Some(AttributeKind::GeoProperty),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// An attribute holding a value.
///
/// A `Null` value counts as missing: it fails validation and is never
/// produced by decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    /// The value, any JSON value
    pub value: Value,
    /// When the value was observed
    pub observed_at: Option<DateTime<Utc>>,
    /// Dataset the value belongs to
    pub dataset_id: Option<String>,
    /// UN/CEFACT unit code of the value
    pub unit_code: Option<String>,
    /// Nested properties and relationships
    pub attributes: Attributes,
}

impl Property {
    /// Create a property holding `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Set the observation timestamp.
    #[must_use]
    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Set the dataset identifier.
    #[must_use]
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Set the unit code.
    #[must_use]
    pub fn with_unit_code(mut self, unit_code: impl Into<String>) -> Self {
        self.unit_code = Some(unit_code.into());
        self
    }

    /// Add a nested property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.attributes.insert_property(name, property);
        self
    }

    /// Add a nested relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.attributes.insert_relationship(name, relationship);
        self
    }

    /// Take `other`'s own fields and merge its nested attributes into ours.
    pub fn merge(&mut self, other: Property) {
        let Property {
            value,
            observed_at,
            dataset_id,
            unit_code,
            attributes,
        } = other;
        self.value = value;
        self.observed_at = observed_at;
        self.dataset_id = dataset_id;
        self.unit_code = unit_code;
        self.attributes.merge(attributes);
    }
}

/// An attribute pointing to another entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    /// Identifier of the target entity
    pub object: String,
    /// When the relationship was observed
    pub observed_at: Option<DateTime<Utc>>,
    /// Dataset the relationship belongs to
    pub dataset_id: Option<String>,
    /// Nested properties and relationships
    pub attributes: Attributes,
}

impl Relationship {
    /// Create a relationship targeting `object`.
    #[must_use]
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            ..Self::default()
        }
    }

    /// Set the observation timestamp.
    #[must_use]
    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Set the dataset identifier.
    #[must_use]
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Add a nested property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.attributes.insert_property(name, property);
        self
    }

    /// Add a nested relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.attributes.insert_relationship(name, relationship);
        self
    }

    /// Take `other`'s own fields and merge its nested attributes into ours.
    pub fn merge(&mut self, other: Relationship) {
        let Relationship {
            object,
            observed_at,
            dataset_id,
            attributes,
        } = other;
        self.object = object;
        self.observed_at = observed_at;
        self.dataset_id = dataset_id;
        self.attributes.merge(attributes);
    }
}

/// An attribute holding a geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoProperty {
    /// The geometry, never a `GeometryCollection` once validated
    pub value: Geometry,
    /// When the geometry was observed
    pub observed_at: Option<DateTime<Utc>>,
    /// Dataset the geometry belongs to
    pub dataset_id: Option<String>,
    /// Nested properties and relationships
    pub attributes: Attributes,
}

impl GeoProperty {
    /// Create a geoproperty holding `value`.
    #[must_use]
    pub fn new(value: Geometry) -> Self {
        Self {
            value,
            observed_at: None,
            dataset_id: None,
            attributes: Attributes::default(),
        }
    }

    /// Set the observation timestamp.
    #[must_use]
    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Set the dataset identifier.
    #[must_use]
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Add a nested property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.attributes.insert_property(name, property);
        self
    }

    /// Add a nested relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.attributes.insert_relationship(name, relationship);
        self
    }

    /// Take `other`'s own fields and merge its nested attributes into ours.
    pub fn merge(&mut self, other: GeoProperty) {
        let GeoProperty {
            value,
            observed_at,
            dataset_id,
            attributes,
        } = other;
        self.value = value;
        self.observed_at = observed_at;
        self.dataset_id = dataset_id;
        self.attributes.merge(attributes);
    }
}

/// Any of the three attribute kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// A Property
    Property(Property),
    /// A Relationship
    Relationship(Relationship),
    /// A GeoProperty
    GeoProperty(GeoProperty),
}

impl Attribute {
    /// Kind of this attribute.
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Property(_) => AttributeKind::Property,
            Attribute::Relationship(_) => AttributeKind::Relationship,
            Attribute::GeoProperty(_) => AttributeKind::GeoProperty,
        }
    }

    /// Nested attributes of this attribute.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        match self {
            Attribute::Property(p) => &p.attributes,
            Attribute::Relationship(r) => &r.attributes,
            Attribute::GeoProperty(g) => &g.attributes,
        }
    }

    /// Observation timestamp, if any.
    #[must_use]
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Attribute::Property(p) => p.observed_at,
            Attribute::Relationship(r) => r.observed_at,
            Attribute::GeoProperty(g) => g.observed_at,
        }
    }

    /// Dataset identifier, if any.
    #[must_use]
    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            Attribute::Property(p) => p.dataset_id.as_deref(),
            Attribute::Relationship(r) => r.dataset_id.as_deref(),
            Attribute::GeoProperty(g) => g.dataset_id.as_deref(),
        }
    }
}

impl From<Property> for Attribute {
    fn from(p: Property) -> Self {
        Attribute::Property(p)
    }
}

impl From<Relationship> for Attribute {
    fn from(r: Relationship) -> Self {
        Attribute::Relationship(r)
    }
}

impl From<GeoProperty> for Attribute {
    fn from(g: GeoProperty) -> Self {
        Attribute::GeoProperty(g)
    }
}
