//! Request bodies for entity creation and batch upsert.
//!
//! Every entity is validated in strict mode before it is encoded, so an
//! invalid entity never reaches the wire.

use crate::context::{LdContext, CONTEXT_KEY};
use ngsild_model::{Codec, Entity, Validate};
use serde_json::Value;

/// An entity paired with the context it should be sent with.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityWithContext {
    /// Context, the core context when absent
    pub context: Option<LdContext>,
    /// The entity
    pub entity: Entity,
}

impl EntityWithContext {
    /// Pair an entity with the default context.
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            context: None,
            entity,
        }
    }

    /// Pair an entity with an explicit context.
    #[must_use]
    pub fn with_context(entity: Entity, context: LdContext) -> Self {
        Self {
            context: Some(context),
            entity,
        }
    }
}

/// Validate `entity`, encode it and attach `context`.
///
/// # Errors
///
/// Returns [`PayloadError::InvalidEntity`] if strict validation fails and
/// [`PayloadError::Encode`] if the entity cannot be encoded.
pub fn with_context(entity: &Entity, context: &LdContext) -> Result<Value, PayloadError> {
    entity
        .validate(true)
        .map_err(|source| PayloadError::InvalidEntity {
            id: entity.id.clone(),
            source,
        })?;

    let mut value = entity.to_json_value().map_err(PayloadError::Encode)?;
    if let Value::Object(object) = &mut value {
        object.insert(CONTEXT_KEY.to_string(), context.to_value());
    }
    Ok(value)
}

/// Body of a create-entity request.
///
/// # Errors
///
/// See [`with_context`].
pub fn create_body(entity: &Entity, context: Option<&LdContext>) -> Result<Vec<u8>, PayloadError> {
    let default_context = LdContext::default();
    let value = with_context(entity, context.unwrap_or(&default_context))?;
    tracing::debug!(id = entity.id.as_str(), "Built create body");
    serde_json::to_vec(&value).map_err(|e| PayloadError::Encode(ngsild_model::Error::Serialize(e)))
}

/// Body of a batch upsert request: a JSON array of contexted entities.
///
/// # Errors
///
/// Fails on the first entity that does not validate or encode.
pub fn batch_body(entities: &[EntityWithContext]) -> Result<Vec<u8>, PayloadError> {
    let default_context = LdContext::default();
    let items = entities
        .iter()
        .map(|item| with_context(&item.entity, item.context.as_ref().unwrap_or(&default_context)))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = items.len(), "Built batch body");
    serde_json::to_vec(&items).map_err(|e| PayloadError::Encode(ngsild_model::Error::Serialize(e)))
}

/// Errors that can occur while building request bodies.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The entity failed strict validation
    #[error("invalid entity {id}: {source}")]
    InvalidEntity {
        /// Identifier of the rejected entity
        id: String,
        /// Violated invariant
        #[source]
        source: ngsild_model::Error,
    },
    /// The entity could not be encoded
    #[error("encode error: {0}")]
    Encode(#[source] ngsild_model::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CORE_CONTEXT;
    use ngsild_model::{Property, Relationship};
    use serde_json::json;

    #[test]
    fn context_is_a_sibling_key() {
        let entity = Entity::new("entity:1", "thing").with_property("on", Property::new(true));
        let value = with_context(&entity, &LdContext::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "@context": CORE_CONTEXT,
                "id": "entity:1",
                "type": "thing",
                "on": {"type": "Property", "value": true}
            })
        );
    }

    #[test]
    fn create_body_defaults_context() {
        let body = create_body(&Entity::new("entity:1", "thing"), None).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["@context"], json!(CORE_CONTEXT));
    }

    #[test]
    fn invalid_entity_is_rejected_before_encoding() {
        let entity = Entity::new("entity:1", "thing").with_relationship("r", Relationship::default());
        let err = create_body(&entity, None).unwrap_err();
        match err {
            PayloadError::InvalidEntity { id, source } => {
                assert_eq!(id, "entity:1");
                assert!(matches!(source.root(), ngsild_model::Error::RelationshipMissingObject));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn batch_body_keeps_per_entity_context() {
        let custom = LdContext::from("https://example.org/ctx.jsonld");
        let body = batch_body(&[
            EntityWithContext::new(Entity::new("a:1", "T")),
            EntityWithContext::with_context(Entity::new("a:2", "T"), custom),
        ])
        .unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value[0]["@context"], json!(CORE_CONTEXT));
        assert_eq!(value[1]["@context"], json!("https://example.org/ctx.jsonld"));
        assert_eq!(value[1]["id"], json!("a:2"));
    }

    #[test]
    fn non_finite_location_is_rejected() {
        use ngsild_model::{GeoProperty, Geometry};

        let entity = Entity::new("entity:1", "thing")
            .with_location(GeoProperty::new(Geometry::point(f64::NAN, 0.0)));
        // strict validation sees the coordinate first
        let err = create_body(&entity, None).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::InvalidEntity {
                source: ngsild_model::Error::Nested { .. },
                ..
            }
        ));
    }

    #[test]
    fn batch_body_fails_on_first_invalid() {
        let err = batch_body(&[
            EntityWithContext::new(Entity::new("a:1", "T")),
            EntityWithContext::new(Entity::new("", "T")),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            PayloadError::InvalidEntity {
                source: ngsild_model::Error::EntityMissingId,
                ..
            }
        ));
    }
}
