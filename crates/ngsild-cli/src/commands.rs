//! Command implementations.
//!
//! Every command takes the raw document text and returns what should be
//! printed, so they can be exercised without a terminal.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use ngsild_model::{Attributes, Codec, Entity, GeoProperty, Validate};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

/// Read a document from a file, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns error if the input cannot be read.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {path}"))
    }
}

fn decode_entity(input: &str) -> Result<Entity> {
    Entity::from_json_str(input).context("Failed to decode entity")
}

fn render(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to render JSON")
    } else {
        serde_json::to_string(value).context("Failed to render JSON")
    }
}

/// Decode and validate an entity.
///
/// # Errors
///
/// Returns error if the entity does not decode or validate.
pub fn validate(input: &str, strict: bool) -> Result<String> {
    let entity = decode_entity(input)?;
    entity
        .validate(strict)
        .with_context(|| format!("Entity {} is invalid", entity.id))?;
    tracing::info!(id = entity.id.as_str(), strict, "Entity is valid");
    Ok("ok".to_string())
}

/// Decode and re-encode an entity, dropping unrecognized keys.
///
/// # Errors
///
/// Returns error if the entity does not decode.
pub fn normalize(input: &str, config: &CliConfig) -> Result<String> {
    let entity = decode_entity(input)?;
    let value = entity.to_json_value().context("Failed to encode entity")?;
    render(&value, config.pretty)
}

/// Decode an entity and emit it with the configured `@context`.
///
/// Write bodies are always validated strictly, whatever the configuration.
///
/// # Errors
///
/// Returns error if the entity does not decode or validate.
pub fn wrap(input: &str, config: &CliConfig) -> Result<String> {
    let entity = decode_entity(input)?;
    let value = ngsild_ld::with_context(&entity, &config.context)
        .with_context(|| format!("Failed to wrap entity {}", entity.id))?;
    render(&value, config.pretty)
}

/// Describe the attribute tree of an entity.
///
/// # Errors
///
/// Returns error if the entity does not decode.
pub fn inspect(input: &str) -> Result<String> {
    let entity = decode_entity(input)?;
    let mut out = format!("{} ({})\n", entity.id, entity.entity_type);
    for (key, geo) in entity.geo_properties() {
        describe_geo(&mut out, 1, key, geo);
    }
    describe_attributes(&mut out, 1, &entity.attributes);
    Ok(out)
}

fn describe_geo(out: &mut String, depth: usize, name: &str, geo: &GeoProperty) {
    let _ = writeln!(
        out,
        "{:indent$}{name}: GeoProperty {}",
        "",
        geo.value.kind(),
        indent = depth * 2
    );
    describe_attributes(out, depth + 1, &geo.attributes);
}

fn describe_attributes(out: &mut String, depth: usize, attributes: &Attributes) {
    for (name, property) in attributes.properties() {
        let _ = writeln!(
            out,
            "{:indent$}{name}: Property = {}",
            "",
            property.value,
            indent = depth * 2
        );
        describe_attributes(out, depth + 1, &property.attributes);
    }
    for (name, relationship) in attributes.relationships() {
        let _ = writeln!(
            out,
            "{:indent$}{name}: Relationship -> {}",
            "",
            relationship.object,
            indent = depth * 2
        );
        describe_attributes(out, depth + 1, &relationship.attributes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CABIN: &str = r#"{"id":"cabin:4","type":"thing","light":{"type":"Property","value":100,"wall":{"type":"Relationship","object":"wall:right"}},"x":{"type":"Widget"}}"#;

    #[test]
    fn validate_ok_and_failure() {
        assert_eq!(validate(CABIN, true).unwrap(), "ok");

        let err = validate(r#"{"id":"e:1"}"#, true).unwrap_err();
        assert!(format!("{err:#}").contains(r#""type" field"#), "{err:#}");

        assert!(validate(r#"{"id":"room 1","type":"Room"}"#, false).is_ok());
        assert!(validate(r#"{"id":"room 1","type":"Room"}"#, true).is_err());
    }

    #[test]
    fn normalize_drops_unknown() {
        let out = normalize(CABIN, &CliConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("x").is_none());
        assert_eq!(value["light"]["wall"]["object"], json!("wall:right"));
    }

    #[test]
    fn wrap_adds_context() {
        let out = wrap(CABIN, &CliConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["@context"], json!(ngsild_ld::CORE_CONTEXT));
    }

    #[test]
    fn inspect_tree() {
        let out = inspect(CABIN).unwrap();
        assert_eq!(
            out,
            "cabin:4 (thing)\n  light: Property = 100\n    wall: Relationship -> wall:right\n"
        );
    }
}
