//! Named attribute container used by entities and by every attribute.
//!
//! Holds two kind-homogeneous maps (properties and relationships) whose
//! names never overlap: inserting under a taken name replaces whatever was
//! there. An empty container is the same as an absent one.

use crate::attribute::{Attribute, Property, Relationship};
use serde::ser::SerializeMap;
use std::collections::BTreeMap;

/// Properties and relationships keyed by caller-chosen names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    properties: BTreeMap<String, Property>,
    relationships: BTreeMap<String, Relationship>,
}

impl Attributes {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes of either kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len() + self.relationships.len()
    }

    /// Whether the container holds no attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.relationships.is_empty()
    }

    /// Whether an attribute of either kind is named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name) || self.relationships.contains_key(name)
    }

    /// Insert a property, returning the attribute it replaced.
    pub fn insert_property(
        &mut self,
        name: impl Into<String>,
        property: Property,
    ) -> Option<Attribute> {
        let name = name.into();
        let previous = self
            .relationships
            .remove(&name)
            .map(Attribute::Relationship);
        self.properties
            .insert(name, property)
            .map(Attribute::Property)
            .or(previous)
    }

    /// Insert a relationship, returning the attribute it replaced.
    pub fn insert_relationship(
        &mut self,
        name: impl Into<String>,
        relationship: Relationship,
    ) -> Option<Attribute> {
        let name = name.into();
        let previous = self.properties.remove(&name).map(Attribute::Property);
        self.relationships
            .insert(name, relationship)
            .map(Attribute::Relationship)
            .or(previous)
    }

    /// Remove the attribute named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.properties
            .remove(name)
            .map(Attribute::Property)
            .or_else(|| self.relationships.remove(name).map(Attribute::Relationship))
    }

    /// Property named `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Mutable property named `name`.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    /// Relationship named `name`.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// Mutable relationship named `name`.
    pub fn relationship_mut(&mut self, name: &str) -> Option<&mut Relationship> {
        self.relationships.get_mut(name)
    }

    /// All properties, ordered by name.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, Property> {
        &self.properties
    }

    /// All relationships, ordered by name.
    #[must_use]
    pub fn relationships(&self) -> &BTreeMap<String, Relationship> {
        &self.relationships
    }

    /// Names of all attributes: properties first, then relationships.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .chain(self.relationships.keys())
            .map(String::as_str)
    }

    /// Apply every attribute of `other` on top of this container.
    ///
    /// Same name and same kind: the incoming attribute's own fields win and
    /// the nested containers are merged recursively. Otherwise the incoming
    /// attribute replaces the existing one.
    pub fn merge(&mut self, other: Attributes) {
        for (name, incoming) in other.properties {
            match self.properties.get_mut(&name) {
                Some(existing) => existing.merge(incoming),
                None => {
                    self.insert_property(name, incoming);
                }
            }
        }
        for (name, incoming) in other.relationships {
            match self.relationships.get_mut(&name) {
                Some(existing) => existing.merge(incoming),
                None => {
                    self.insert_relationship(name, incoming);
                }
            }
        }
    }

    /// Splice every attribute into an object being serialized.
    pub(crate) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (name, property) in &self.properties {
            map.serialize_entry(name, property)?;
        }
        for (name, relationship) in &self.relationships {
            map.serialize_entry(name, relationship)?;
        }
        Ok(())
    }
}
