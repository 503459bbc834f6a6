//! CLI configuration.

use anyhow::{bail, Context, Result};
use ngsild_ld::LdContext;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Context attached by `wrap`
    pub context: LdContext,

    /// Run validation in strict mode
    pub strict: bool,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            context: LdContext::default(),
            strict: true,
            pretty: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NGSILD_CONTEXT`: context IRI, or a JSON array/object
    /// - `NGSILD_STRICT`: "true" or "false"
    /// - `NGSILD_PRETTY`: "true" or "false"
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(context) = lookup("NGSILD_CONTEXT") {
            let trimmed = context.trim();
            config.context = if trimmed.starts_with('[') || trimmed.starts_with('{') {
                serde_json::from_str(trimmed).context("Invalid NGSILD_CONTEXT JSON")?
            } else {
                LdContext::from(trimmed)
            };
        }

        if let Some(strict) = lookup("NGSILD_STRICT") {
            config.strict = parse_bool("NGSILD_STRICT", &strict)?;
        }

        if let Some(pretty) = lookup("NGSILD_PRETTY") {
            config.pretty = parse_bool("NGSILD_PRETTY", &pretty)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("Invalid {key}: expected true or false, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_default() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.strict);
        assert!(!config.pretty);
    }

    #[test]
    fn context_iri_and_json() {
        let config =
            CliConfig::from_lookup(lookup(&[("NGSILD_CONTEXT", "https://example.org/ctx.jsonld")]))
                .unwrap();
        assert_eq!(
            config.context,
            LdContext::Iri("https://example.org/ctx.jsonld".to_string())
        );

        let config = CliConfig::from_lookup(lookup(&[(
            "NGSILD_CONTEXT",
            r#"["https://example.org/ctx.jsonld"]"#,
        )]))
        .unwrap();
        assert!(matches!(config.context, LdContext::List(_)));

        assert!(CliConfig::from_lookup(lookup(&[("NGSILD_CONTEXT", "[oops")])).is_err());
    }

    #[test]
    fn booleans() {
        let config = CliConfig::from_lookup(lookup(&[
            ("NGSILD_STRICT", "false"),
            ("NGSILD_PRETTY", "YES"),
        ]))
        .unwrap();
        assert!(!config.strict);
        assert!(config.pretty);

        let err = CliConfig::from_lookup(lookup(&[("NGSILD_STRICT", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("NGSILD_STRICT"));
    }
}
