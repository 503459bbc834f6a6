//! JSON-LD encoding and decoding of entities and attributes.
//!
//! ## Wire shape
//!
//! Every attribute is a single flat JSON object: the `type` discriminator,
//! the mandatory `value`/`object` member, the optional members that are set,
//! and every nested attribute spliced in at the same level under its own
//! name. Entities emit `id`, `type` and their well-known geo attributes, then
//! splice their attributes the same way.
//!
//! ## Decoding
//!
//! Attribute names are chosen by the caller, so decoding runs in passes:
//!
//! 1. deserialize the schema's fixed fields only
//! 2. check the mandatory fields
//! 3. check the discriminator (attribute kinds only)
//! 4. subtract the schema's reserved keys from the object, leaving residuals
//! 5. peek each residual's own `type`: `Relationship` and `Property` are
//!    decoded recursively, anything else is dropped without error
//!
//! Failures inside a residual are wrapped in [`Error::Nested`] with its key.

use crate::attribute::{
    Attribute, AttributeKind, GeoProperty, Property, Relationship, GEO_PROPERTY, PROPERTY,
    RELATIONSHIP,
};
use crate::attributes::Attributes;
use crate::entity::{Entity, LOCATION, OBSERVATION_SPACE, OPERATION_SPACE};
use crate::error::{Error, Schema};
use crate::geometry::Geometry;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Keys owned by the entity schema.
pub const ENTITY_KEYS: &[&str] = &[
    "id",
    "type",
    LOCATION,
    OBSERVATION_SPACE,
    OPERATION_SPACE,
    "@context",
];
/// Keys owned by the Property schema.
pub const PROPERTY_KEYS: &[&str] = &["type", "value", "observedAt", "datasetId", "unitCode"];
/// Keys owned by the Relationship schema.
pub const RELATIONSHIP_KEYS: &[&str] = &["type", "object", "observedAt", "datasetId"];
/// Keys owned by the GeoProperty schema.
pub const GEO_PROPERTY_KEYS: &[&str] = &["type", "value", "observedAt", "datasetId"];

/// Format a timestamp the way NGSI-LD brokers expect it: UTC, microseconds.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Types with a JSON-LD representation.
pub trait Codec: Serialize + Sized {
    /// Schema reported by parse errors.
    const SCHEMA: Schema;

    /// Decode from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found, see the module docs.
    fn from_json_value(value: &Value) -> Result<Self, Error>;

    /// Decode from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the bytes are not JSON, otherwise as
    /// [`Codec::from_json_value`].
    fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(bytes).map_err(|source| Error::Malformed {
            schema: Self::SCHEMA,
            source,
        })?;
        Self::from_json_value(&value)
    }

    /// Decode from a string.
    ///
    /// # Errors
    ///
    /// As [`Codec::from_slice`].
    fn from_json_str(s: &str) -> Result<Self, Error> {
        Self::from_slice(s.as_bytes())
    }

    /// Encode to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if a value cannot be represented.
    fn to_json_value(&self) -> Result<Value, Error> {
        serde_json::to_value(self).map_err(Error::Serialize)
    }

    /// Encode to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if a value cannot be represented.
    fn to_vec(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::Serialize)
    }

    /// Encode to a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if a value cannot be represented.
    fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::Serialize)
    }
}

/// Decode any codec type from bytes.
///
/// # Errors
///
/// See [`Codec::from_slice`].
pub fn decode<T: Codec>(bytes: &[u8]) -> Result<T, Error> {
    T::from_slice(bytes)
}

/// Encode any codec type to bytes.
///
/// # Errors
///
/// See [`Codec::to_vec`].
pub fn encode<T: Codec>(value: &T) -> Result<Vec<u8>, Error> {
    value.to_vec()
}

/// Decode an attribute of any kind, dispatching on its discriminator.
///
/// # Errors
///
/// Returns [`Error::UnknownAttributeType`] when the discriminator is absent
/// or unknown, otherwise the errors of the matching kind.
pub fn decode_attribute(value: &Value) -> Result<Attribute, Error> {
    let Value::Object(object) = value else {
        return Err(Error::InvalidAttribute {
            found: json_kind(value),
        });
    };
    let found = object.get("type").and_then(Value::as_str).unwrap_or_default();
    match AttributeKind::from_discriminator(found) {
        Some(AttributeKind::Property) => Property::from_json_value(value).map(Attribute::Property),
        Some(AttributeKind::Relationship) => {
            Relationship::from_json_value(value).map(Attribute::Relationship)
        }
        Some(AttributeKind::GeoProperty) => {
            GeoProperty::from_json_value(value).map(Attribute::GeoProperty)
        }
        None => Err(Error::UnknownAttributeType {
            found: found.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fixed-field pass: deserialize only the fields `T` declares.
fn fixed_fields<T: DeserializeOwned>(schema: Schema, value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|source| Error::Malformed { schema, source })
}

fn as_object(schema: Schema, value: &Value) -> Result<&Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| Error::malformed(schema, "expected a JSON object"))
}

fn has_discriminator(object: &Map<String, Value>, kind: AttributeKind) -> bool {
    object.get("type").and_then(Value::as_str) == Some(kind.discriminator())
}

/// Residual-key passes: classify every key not in `reserved` by its own
/// discriminator and decode the recognized ones.
fn decode_residuals(
    schema: Schema,
    object: &Map<String, Value>,
    reserved: &[&str],
) -> Result<Attributes, Error> {
    let mut attributes = Attributes::new();

    for (key, raw) in object.iter().filter(|(k, _)| !reserved.contains(&k.as_str())) {
        if raw.is_null() {
            tracing::trace!(%schema, key = key.as_str(), "Dropped null attribute");
            continue;
        }
        let Value::Object(inner) = raw else {
            return Err(Error::nested(
                schema,
                key.as_str(),
                Error::InvalidAttribute {
                    found: json_kind(raw),
                },
            ));
        };

        match inner.get("type").and_then(Value::as_str) {
            Some(RELATIONSHIP) => {
                let relationship = Relationship::from_json_value(raw)
                    .map_err(|e| Error::nested(schema, key.as_str(), e))?;
                attributes.insert_relationship(key.as_str(), relationship);
            }
            Some(PROPERTY) => {
                let property = Property::from_json_value(raw)
                    .map_err(|e| Error::nested(schema, key.as_str(), e))?;
                attributes.insert_property(key.as_str(), property);
            }
            other => {
                tracing::trace!(%schema, key = key.as_str(), kind = ?other, "Dropped unrecognized attribute");
            }
        }
    }

    Ok(attributes)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyFields {
    value: Option<Value>,
    observed_at: Option<DateTime<Utc>>,
    dataset_id: Option<String>,
    unit_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipFields {
    object: Option<String>,
    observed_at: Option<DateTime<Utc>>,
    dataset_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoPropertyFields {
    value: Option<Geometry>,
    observed_at: Option<DateTime<Utc>>,
    dataset_id: Option<String>,
}

#[derive(Deserialize)]
struct EntityFields {
    id: Option<String>,
    #[serde(rename = "type")]
    entity_type: Option<String>,
}

impl Codec for Property {
    const SCHEMA: Schema = Schema::Property;

    fn from_json_value(value: &Value) -> Result<Self, Error> {
        let fields: PropertyFields = fixed_fields(Self::SCHEMA, value)?;
        let object = as_object(Self::SCHEMA, value)?;

        let Some(property_value) = fields.value else {
            return Err(Error::PropertyMissingValue);
        };
        if !has_discriminator(object, AttributeKind::Property) {
            return Err(Error::PropertyWrongType);
        }

        let attributes = decode_residuals(Self::SCHEMA, object, PROPERTY_KEYS)?;

        Ok(Property {
            value: property_value,
            observed_at: fields.observed_at,
            dataset_id: fields.dataset_id,
            unit_code: fields.unit_code,
            attributes,
        })
    }
}

impl Codec for Relationship {
    const SCHEMA: Schema = Schema::Relationship;

    fn from_json_value(value: &Value) -> Result<Self, Error> {
        let fields: RelationshipFields = fixed_fields(Self::SCHEMA, value)?;
        let object = as_object(Self::SCHEMA, value)?;

        let target = match fields.object {
            Some(target) if !target.is_empty() => target,
            _ => return Err(Error::RelationshipMissingObject),
        };
        if !has_discriminator(object, AttributeKind::Relationship) {
            return Err(Error::RelationshipWrongType);
        }

        let attributes = decode_residuals(Self::SCHEMA, object, RELATIONSHIP_KEYS)?;

        Ok(Relationship {
            object: target,
            observed_at: fields.observed_at,
            dataset_id: fields.dataset_id,
            attributes,
        })
    }
}

impl Codec for GeoProperty {
    const SCHEMA: Schema = Schema::GeoProperty;

    fn from_json_value(value: &Value) -> Result<Self, Error> {
        let fields: GeoPropertyFields = fixed_fields(Self::SCHEMA, value)?;
        let object = as_object(Self::SCHEMA, value)?;

        let Some(geometry) = fields.value else {
            return Err(Error::GeoPropertyMissingValue);
        };
        if !geometry.is_valid_geoproperty_value() {
            return Err(Error::GeoPropertyInvalidValue);
        }
        if !has_discriminator(object, AttributeKind::GeoProperty) {
            return Err(Error::GeoPropertyWrongType);
        }

        let attributes = decode_residuals(Self::SCHEMA, object, GEO_PROPERTY_KEYS)?;

        Ok(GeoProperty {
            value: geometry,
            observed_at: fields.observed_at,
            dataset_id: fields.dataset_id,
            attributes,
        })
    }
}

fn well_known_geo(object: &Map<String, Value>, key: &str) -> Result<Option<GeoProperty>, Error> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => GeoProperty::from_json_value(raw)
            .map(Some)
            .map_err(|e| Error::nested(Schema::Entity, key, e)),
    }
}

impl Codec for Entity {
    const SCHEMA: Schema = Schema::Entity;

    fn from_json_value(value: &Value) -> Result<Self, Error> {
        let fields: EntityFields = fixed_fields(Self::SCHEMA, value)?;
        let object = as_object(Self::SCHEMA, value)?;
        let location = well_known_geo(object, LOCATION)?;
        let observation_space = well_known_geo(object, OBSERVATION_SPACE)?;
        let operation_space = well_known_geo(object, OPERATION_SPACE)?;

        let id = match fields.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(Error::EntityMissingId),
        };
        let entity_type = match fields.entity_type {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Error::EntityMissingType),
        };

        let attributes = decode_residuals(Self::SCHEMA, object, ENTITY_KEYS)?;

        tracing::debug!(
            id = id.as_str(),
            entity_type = entity_type.as_str(),
            attributes = attributes.len(),
            "Decoded entity"
        );

        Ok(Entity {
            id,
            entity_type,
            location,
            observation_space,
            operation_space,
            attributes,
        })
    }
}

impl Codec for Attribute {
    const SCHEMA: Schema = Schema::Attribute;

    fn from_json_value(value: &Value) -> Result<Self, Error> {
        decode_attribute(value)
    }
}

fn serialize_common<M: SerializeMap>(
    map: &mut M,
    observed_at: Option<&DateTime<Utc>>,
    dataset_id: Option<&String>,
) -> Result<(), M::Error> {
    if let Some(observed_at) = observed_at {
        map.serialize_entry("observedAt", &format_timestamp(observed_at))?;
    }
    if let Some(dataset_id) = dataset_id {
        map.serialize_entry("datasetId", dataset_id)?;
    }
    Ok(())
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", PROPERTY)?;
        map.serialize_entry("value", &self.value)?;
        serialize_common(&mut map, self.observed_at.as_ref(), self.dataset_id.as_ref())?;
        if let Some(unit_code) = &self.unit_code {
            map.serialize_entry("unitCode", unit_code)?;
        }
        self.attributes.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for Relationship {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", RELATIONSHIP)?;
        map.serialize_entry("object", &self.object)?;
        serialize_common(&mut map, self.observed_at.as_ref(), self.dataset_id.as_ref())?;
        self.attributes.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for GeoProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.value.is_finite() {
            return Err(serde::ser::Error::custom(
                "geometry coordinates must be finite numbers",
            ));
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", GEO_PROPERTY)?;
        map.serialize_entry("value", &self.value)?;
        serialize_common(&mut map, self.observed_at.as_ref(), self.dataset_id.as_ref())?;
        self.attributes.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("type", &self.entity_type)?;
        for (key, geo) in self.geo_properties() {
            map.serialize_entry(key, geo)?;
        }
        self.attributes.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attribute::Property(p) => p.serialize(serializer),
            Attribute::Relationship(r) => r.serialize(serializer),
            Attribute::GeoProperty(g) => g.serialize(serializer),
        }
    }
}

/// Route serde deserialization through the multi-pass decoder.
macro_rules! deserialize_via_codec {
    ($($ty:ty),*) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let value = Value::deserialize(deserializer)?;
                    <$ty as Codec>::from_json_value(&value).map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

deserialize_via_codec!(Property, Relationship, GeoProperty, Entity, Attribute);
