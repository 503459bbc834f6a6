//! Structural and plausibility checks.
//!
//! Structural checks always run: mandatory fields, the GeoProperty geometry
//! restriction and reserved attribute names. Strict mode also rejects values
//! that are well-formed but not sane (identifiers that are not absolute URIs,
//! coordinates outside WGS 84 ranges, degenerate shapes).
//!
//! Validation walks the tree top-down and stops at the first failure.

use crate::attribute::{Attribute, GeoProperty, Property, Relationship};
use crate::attributes::Attributes;
use crate::codec::{ENTITY_KEYS, GEO_PROPERTY_KEYS, PROPERTY_KEYS, RELATIONSHIP_KEYS};
use crate::entity::Entity;
use crate::error::{Error, Schema};

/// Types that can check their own invariants.
pub trait Validate {
    /// Run the checks.
    ///
    /// Strict mode treats values that are technically valid but not sane as
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    fn validate(&self, strict: bool) -> Result<(), Error>;
}

fn check_uri(what: &str, s: &str) -> Result<(), Error> {
    url::Url::parse(s).map(|_| ()).map_err(|e| Error::Implausible {
        reason: format!("{what} {s:?} is not an absolute URI: {e}"),
    })
}

fn check_dataset_id(dataset_id: Option<&str>, strict: bool) -> Result<(), Error> {
    match dataset_id {
        Some(id) if strict => check_uri("datasetId", id),
        _ => Ok(()),
    }
}

fn validate_attributes(
    schema: Schema,
    reserved: &[&str],
    attributes: &Attributes,
    strict: bool,
) -> Result<(), Error> {
    for name in attributes.names() {
        if reserved.contains(&name) {
            return Err(Error::ReservedAttributeName {
                schema,
                name: name.to_string(),
            });
        }
    }
    for (name, property) in attributes.properties() {
        property
            .validate(strict)
            .map_err(|e| Error::nested(schema, name.as_str(), e))?;
    }
    for (name, relationship) in attributes.relationships() {
        relationship
            .validate(strict)
            .map_err(|e| Error::nested(schema, name.as_str(), e))?;
    }
    Ok(())
}

impl Validate for Property {
    fn validate(&self, strict: bool) -> Result<(), Error> {
        if self.value.is_null() {
            return Err(Error::PropertyMissingValue);
        }
        check_dataset_id(self.dataset_id.as_deref(), strict)?;
        validate_attributes(Schema::Property, PROPERTY_KEYS, &self.attributes, strict)
    }
}

impl Validate for Relationship {
    fn validate(&self, strict: bool) -> Result<(), Error> {
        if self.object.is_empty() {
            return Err(Error::RelationshipMissingObject);
        }
        if strict {
            check_uri("object", &self.object)?;
        }
        check_dataset_id(self.dataset_id.as_deref(), strict)?;
        validate_attributes(
            Schema::Relationship,
            RELATIONSHIP_KEYS,
            &self.attributes,
            strict,
        )
    }
}

impl Validate for GeoProperty {
    fn validate(&self, strict: bool) -> Result<(), Error> {
        if !self.value.is_valid_geoproperty_value() {
            return Err(Error::GeoPropertyInvalidValue);
        }
        if strict {
            self.value
                .check_plausible()
                .map_err(|reason| Error::Implausible { reason })?;
        }
        check_dataset_id(self.dataset_id.as_deref(), strict)?;
        validate_attributes(
            Schema::GeoProperty,
            GEO_PROPERTY_KEYS,
            &self.attributes,
            strict,
        )
    }
}

impl Validate for Attribute {
    fn validate(&self, strict: bool) -> Result<(), Error> {
        match self {
            Attribute::Property(p) => p.validate(strict),
            Attribute::Relationship(r) => r.validate(strict),
            Attribute::GeoProperty(g) => g.validate(strict),
        }
    }
}

impl Validate for Entity {
    fn validate(&self, strict: bool) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::EntityMissingId);
        }
        if self.entity_type.is_empty() {
            return Err(Error::EntityMissingType);
        }
        if strict {
            check_uri("id", &self.id)?;
        }
        for (key, geo) in self.geo_properties() {
            geo.validate(strict)
                .map_err(|e| Error::nested(Schema::Entity, key, e))?;
        }
        validate_attributes(Schema::Entity, ENTITY_KEYS, &self.attributes, strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn valid_entity() -> Entity {
        Entity::new("urn:ngsi-ld:Room:1", "Room")
            .with_location(GeoProperty::new(Geometry::point(11.25, 43.77)))
            .with_property(
                "temperature",
                Property::new(21.5)
                    .with_unit_code("CEL")
                    .with_relationship("sensor", Relationship::new("urn:ngsi-ld:Sensor:9")),
            )
    }

    #[test]
    fn valid_entity_passes_both_modes() {
        let entity = valid_entity();
        assert!(entity.validate(false).is_ok());
        assert!(entity.validate(true).is_ok());
    }

    #[test]
    fn missing_mandatory_fields() {
        let err = Entity::new("", "Room").validate(false).unwrap_err();
        assert!(matches!(err, Error::EntityMissingId), "{err}");

        let err = Entity::new("urn:x:1", "").validate(false).unwrap_err();
        assert!(matches!(err, Error::EntityMissingType), "{err}");

        let err = Entity::new("urn:x:1", "Room")
            .with_property("p", Property::default())
            .validate(false)
            .unwrap_err();
        assert!(matches!(err.root(), Error::PropertyMissingValue), "{err}");

        let err = Entity::new("urn:x:1", "Room")
            .with_relationship("r", Relationship::default())
            .validate(false)
            .unwrap_err();
        assert!(matches!(err.root(), Error::RelationshipMissingObject), "{err}");
    }

    #[test]
    fn geometry_collection_is_rejected() {
        let geo = GeoProperty::new(Geometry::GeometryCollection {
            geometries: vec![Geometry::point(1.0, 2.0)],
        });
        assert!(matches!(
            geo.validate(false),
            Err(Error::GeoPropertyInvalidValue)
        ));

        let entity = Entity::new("urn:x:1", "Room").with_observation_space(geo);
        let err = entity.validate(false).unwrap_err();
        assert!(matches!(err.root(), Error::GeoPropertyInvalidValue));
        assert_eq!(err.path(), vec!["observationSpace"]);
    }

    #[test]
    fn deep_failure_reports_path() {
        let entity = Entity::new("urn:x:1", "Room").with_property(
            "light",
            Property::new(100).with_relationship(
                "wall",
                Relationship::new("wall:1").with_property("color", Property::default()),
            ),
        );
        let err = entity.validate(false).unwrap_err();
        assert!(matches!(err.root(), Error::PropertyMissingValue));
        assert_eq!(err.path(), vec!["light", "wall", "color"]);
    }

    #[test]
    fn reserved_names_are_rejected() {
        let entity = Entity::new("urn:x:1", "Room").with_property("location", Property::new(1));
        assert!(matches!(
            entity.validate(false),
            Err(Error::ReservedAttributeName {
                schema: Schema::Entity,
                ..
            })
        ));

        let property = Property::new(1).with_property("unitCode", Property::new("x"));
        assert!(matches!(
            property.validate(false),
            Err(Error::ReservedAttributeName {
                schema: Schema::Property,
                ..
            })
        ));
    }

    #[test]
    fn strict_mode_checks_identifiers() {
        let entity = Entity::new("room 1", "Room");
        assert!(entity.validate(false).is_ok());
        assert!(matches!(
            entity.validate(true),
            Err(Error::Implausible { .. })
        ));

        let relationship = Relationship::new("not a uri");
        assert!(relationship.validate(false).is_ok());
        assert!(relationship.validate(true).is_err());

        let property = Property::new(9.4).with_dataset_id("UV index");
        assert!(property.validate(false).is_ok());
        assert!(property.validate(true).is_err());
    }

    #[test]
    fn strict_mode_checks_coordinates() {
        let geo = GeoProperty::new(Geometry::point(200.0, 10.0));
        assert!(geo.validate(false).is_ok());
        assert!(matches!(geo.validate(true), Err(Error::Implausible { .. })));
    }
}
