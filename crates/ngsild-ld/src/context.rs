//! JSON-LD `@context` handling.
//!
//! NGSI-LD write requests carry their context inside the body as a sibling
//! `@context` member of the entity object. The context itself is opaque
//! here: a single IRI, a list of IRIs and inline definitions, or an inline
//! object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// IRI of the NGSI-LD core context.
pub const CORE_CONTEXT: &str = "https://uri.etsi.org/ngsi-ld/v1/ngsi-ld-core-context.jsonld";

/// Key under which the context is attached.
pub const CONTEXT_KEY: &str = "@context";

/// A JSON-LD context document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LdContext {
    /// A single context IRI
    Iri(String),
    /// Several IRIs or inline definitions, applied in order
    List(Vec<Value>),
    /// An inline context object
    Inline(serde_json::Map<String, Value>),
}

impl Default for LdContext {
    fn default() -> Self {
        LdContext::Iri(CORE_CONTEXT.to_string())
    }
}

impl LdContext {
    /// Context made of user IRIs followed by the core context.
    #[must_use]
    pub fn with_core<I, S>(iris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<Value> = iris.into_iter().map(|s| Value::String(s.into())).collect();
        list.push(Value::String(CORE_CONTEXT.to_string()));
        LdContext::List(list)
    }

    /// JSON value placed under `@context`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            LdContext::Iri(iri) => Value::String(iri.clone()),
            LdContext::List(list) => Value::Array(list.clone()),
            LdContext::Inline(map) => Value::Object(map.clone()),
        }
    }
}

impl From<&str> for LdContext {
    fn from(iri: &str) -> Self {
        LdContext::Iri(iri.to_string())
    }
}

impl From<String> for LdContext {
    fn from(iri: String) -> Self {
        LdContext::Iri(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_core_context() {
        assert_eq!(LdContext::default().to_value(), json!(CORE_CONTEXT));
    }

    #[test]
    fn with_core_appends_core_last() {
        let ctx = LdContext::with_core(["https://example.org/ctx.jsonld"]);
        assert_eq!(
            ctx.to_value(),
            json!(["https://example.org/ctx.jsonld", CORE_CONTEXT])
        );
    }

    #[test]
    fn untagged_parsing() {
        let ctx: LdContext = serde_json::from_value(json!("https://a/ctx")).unwrap();
        assert_eq!(ctx, LdContext::Iri("https://a/ctx".to_string()));

        let ctx: LdContext = serde_json::from_value(json!(["https://a/ctx", {"x": "y"}])).unwrap();
        assert!(matches!(ctx, LdContext::List(ref l) if l.len() == 2));

        let ctx: LdContext = serde_json::from_value(json!({"brand": "https://schema.org/brand"})).unwrap();
        assert!(matches!(ctx, LdContext::Inline(_)));
    }
}
