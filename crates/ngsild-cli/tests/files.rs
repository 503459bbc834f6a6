use ngsild_cli::{commands, CliConfig};
use serde_json::Value;
use std::io::Write;

fn write_doc(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn wrap_from_file_with_custom_context() {
    let file = write_doc(
        r#"{"id":"urn:ngsi-ld:Bus:1","type":"Bus",
            "location":{"type":"GeoProperty","value":{"type":"Point","coordinates":[11.25,43.77]}},
            "speed":{"type":"Property","value":42,"unitCode":"KMH"}}"#,
    );
    let input = commands::read_input(file.path().to_str().unwrap()).unwrap();

    let config = CliConfig::from_lookup(|key| {
        (key == "NGSILD_CONTEXT").then(|| "https://example.org/bus.jsonld".to_string())
    })
    .unwrap();
    let out = commands::wrap(&input, &config).unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["@context"], "https://example.org/bus.jsonld");
    assert_eq!(value["location"]["value"]["type"], "Point");
    assert_eq!(value["speed"]["unitCode"], "KMH");
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = commands::read_input(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn invalid_geometry_fails_validation() {
    let file = write_doc(
        r#"{"id":"urn:ngsi-ld:Bus:1","type":"Bus",
            "location":{"type":"GeoProperty","value":{"type":"GeometryCollection","geometries":[]}}}"#,
    );
    let input = commands::read_input(file.path().to_str().unwrap()).unwrap();
    let err = commands::validate(&input, false).unwrap_err();
    assert!(format!("{err:#}").contains("GeometryCollection"), "{err:#}");
}
