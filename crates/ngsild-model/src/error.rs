//! Error taxonomy shared by the codec and the validator.
//!
//! Every failure mode has its own variant so callers can match on identity
//! instead of message text. Failures inside nested attributes are wrapped in
//! [`Error::Nested`], one layer per nesting level; [`Error::root`] recovers
//! the innermost cause.

use std::fmt;

/// The schema being decoded or validated when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// An NGSI-LD entity
    Entity,
    /// A Property attribute
    Property,
    /// A Relationship attribute
    Relationship,
    /// A GeoProperty attribute
    GeoProperty,
    /// An attribute of a kind not known yet
    Attribute,
}

impl Schema {
    /// Human readable schema name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Schema::Entity => "Entity",
            Schema::Property => "Property",
            Schema::Relationship => "Relationship",
            Schema::GeoProperty => "GeoProperty",
            Schema::Attribute => "Attribute",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while encoding, decoding or validating NGSI-LD structures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input did not match the schema's fixed fields
    #[error("invalid {schema}: {source}")]
    Malformed {
        /// Schema being decoded
        schema: Schema,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
    /// A nested attribute failed to decode or validate
    #[error("invalid {schema}: attribute {key}: {source}")]
    Nested {
        /// Schema of the parent holding the attribute
        schema: Schema,
        /// Name of the failing attribute
        key: String,
        /// Failure of the attribute itself
        #[source]
        source: Box<Error>,
    },
    /// A residual key held something other than a JSON object
    #[error("attributes must be JSON objects, found {found}")]
    InvalidAttribute {
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// Entity without a non-empty `id`
    #[error(r#"entities must have an "id" field"#)]
    EntityMissingId,
    /// Entity without a non-empty `type`
    #[error(r#"entities must have a "type" field"#)]
    EntityMissingType,

    /// Property discriminator absent or not `"Property"`
    #[error(r#"properties must have "Property" type"#)]
    PropertyWrongType,
    /// Property without a `value`
    #[error(r#"properties must have a "value" field"#)]
    PropertyMissingValue,

    /// Relationship discriminator absent or not `"Relationship"`
    #[error(r#"relationships must have "Relationship" type"#)]
    RelationshipWrongType,
    /// Relationship without a non-empty `object`
    #[error(r#"relationships must have an "object" field"#)]
    RelationshipMissingObject,

    /// GeoProperty discriminator absent or not `"GeoProperty"`
    #[error(r#"geoproperties must have "GeoProperty" type"#)]
    GeoPropertyWrongType,
    /// GeoProperty without a `value`
    #[error(r#"geoproperties must have a "value" field"#)]
    GeoPropertyMissingValue,
    /// GeoProperty holding a `GeometryCollection`
    #[error("geoproperty values must be a geometry other than GeometryCollection")]
    GeoPropertyInvalidValue,

    /// Attribute document with an unrecognized discriminator
    #[error("unknown attribute type: {found}")]
    UnknownAttributeType {
        /// Discriminator found, empty when absent
        found: String,
    },
    /// Attribute named after a key reserved by its parent's schema
    #[error("attribute name {name:?} is reserved in {schema}")]
    ReservedAttributeName {
        /// Schema of the parent
        schema: Schema,
        /// Offending attribute name
        name: String,
    },
    /// Strict validation rejected a structurally valid value
    #[error("implausible value: {reason}")]
    Implausible {
        /// What was rejected
        reason: String,
    },

    /// The JSON writer could not represent the structure
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    /// Wrap a failure of the attribute `key` inside `schema`.
    #[must_use]
    pub fn nested(schema: Schema, key: impl Into<String>, source: Error) -> Self {
        Error::Nested {
            schema,
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping every [`Error::Nested`] layer.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Nested { source, .. } => source.root(),
            other => other,
        }
    }

    /// Attribute names leading from the outermost schema to the root cause.
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Nested { key, source, .. } = current {
            path.push(key.as_str());
            current = source;
        }
        path
    }

    pub(crate) fn malformed(schema: Schema, message: &str) -> Self {
        Error::Malformed {
            schema,
            source: <serde_json::Error as serde::de::Error>::custom(message),
        }
    }
}
