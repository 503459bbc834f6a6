//! The entity aggregate.
//!
//! See <https://github.com/FIWARE/context.Orion-LD/blob/develop/doc/manuals-ld/entities-and-attributes.md>

use crate::attribute::{GeoProperty, Property, Relationship};
use crate::attributes::Attributes;

/// JSON key of the `location` well-known geo attribute.
pub const LOCATION: &str = "location";
/// JSON key of the `observationSpace` well-known geo attribute.
pub const OBSERVATION_SPACE: &str = "observationSpace";
/// JSON key of the `operationSpace` well-known geo attribute.
pub const OPERATION_SPACE: &str = "operationSpace";

/// Root object of the NGSI-LD information model.
///
/// Entities have a mandatory id and type, optional well-known geo attributes
/// and any number of caller-named properties and relationships.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    /// Identifier of the entity, URI-like
    pub id: String,
    /// Category of the entity (serialized as `type`)
    pub entity_type: String,
    /// Where the entity is
    pub location: Option<GeoProperty>,
    /// Area the entity observes
    pub observation_space: Option<GeoProperty>,
    /// Area the entity operates in
    pub operation_space: Option<GeoProperty>,
    /// Caller-named properties and relationships
    pub attributes: Attributes,
}

impl Entity {
    /// Create an entity with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            ..Self::default()
        }
    }

    /// Set the `location` geo attribute.
    #[must_use]
    pub fn with_location(mut self, location: GeoProperty) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the `observationSpace` geo attribute.
    #[must_use]
    pub fn with_observation_space(mut self, space: GeoProperty) -> Self {
        self.observation_space = Some(space);
        self
    }

    /// Set the `operationSpace` geo attribute.
    #[must_use]
    pub fn with_operation_space(mut self, space: GeoProperty) -> Self {
        self.operation_space = Some(space);
        self
    }

    /// Add a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.attributes.insert_property(name, property);
        self
    }

    /// Add a relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.attributes.insert_relationship(name, relationship);
        self
    }

    /// Property named `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.attributes.property(name)
    }

    /// Relationship named `name`.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.attributes.relationship(name)
    }

    /// Well-known geo attributes that are set, with their JSON keys.
    pub fn geo_properties(&self) -> impl Iterator<Item = (&'static str, &GeoProperty)> {
        [
            (LOCATION, self.location.as_ref()),
            (OBSERVATION_SPACE, self.observation_space.as_ref()),
            (OPERATION_SPACE, self.operation_space.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, geo)| geo.map(|g| (key, g)))
    }

    /// Apply an update to this entity, keeping its id and type.
    ///
    /// Geo attributes present in `other` replace ours; generic attributes
    /// are merged with [`Attributes::merge`].
    pub fn merge(&mut self, other: Entity) {
        let Entity {
            location,
            observation_space,
            operation_space,
            attributes,
            ..
        } = other;
        if location.is_some() {
            self.location = location;
        }
        if observation_space.is_some() {
            self.observation_space = observation_space;
        }
        if operation_space.is_some() {
            self.operation_space = operation_space;
        }
        self.attributes.merge(attributes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use serde_json::json;

    #[test]
    fn geo_properties_lists_only_present() {
        let entity = Entity::new("urn:ngsi-ld:Bus:1", "Bus")
            .with_location(GeoProperty::new(Geometry::point(11.2, 43.7)));
        let keys: Vec<_> = entity.geo_properties().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![LOCATION]);
    }

    #[test]
    fn merge_keeps_identity() {
        let mut entity = Entity::new("urn:ngsi-ld:Room:1", "Room")
            .with_property("temperature", Property::new(21.5));
        let update = Entity::new("ignored", "Ignored")
            .with_property("temperature", Property::new(22.0))
            .with_operation_space(GeoProperty::new(Geometry::point(0.0, 0.0)));

        entity.merge(update);

        assert_eq!(entity.id, "urn:ngsi-ld:Room:1");
        assert_eq!(entity.entity_type, "Room");
        assert_eq!(
            entity.property("temperature").map(|p| &p.value),
            Some(&json!(22.0))
        );
        assert!(entity.operation_space.is_some());
        assert!(entity.location.is_none());
    }
}
