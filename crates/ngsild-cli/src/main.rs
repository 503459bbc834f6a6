//! # NGSI-LD CLI
//!
//! Command-line utilities for validating, normalizing and inspecting
//! NGSI-LD entity documents.

use anyhow::Result;
use ngsild_cli::{commands, CliConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let config = CliConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let command = args[1].as_str();
    let output = match command {
        "validate" | "normalize" | "wrap" | "inspect" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: ngsild {command} <file|->");
                std::process::exit(1);
            };
            let input = commands::read_input(path)?;
            match command {
                "validate" => {
                    let strict = config.strict && !args.iter().any(|a| a == "--lax");
                    commands::validate(&input, strict)?
                }
                "normalize" => commands::normalize(&input, &config)?,
                "wrap" => commands::wrap(&input, &config)?,
                _ => commands::inspect(&input)?,
            }
        }
        "help" | "--help" | "-h" => {
            print_help();
            return Ok(());
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn print_help() {
    println!(
        r#"NGSI-LD CLI

USAGE:
    ngsild <COMMAND> <FILE|-> [OPTIONS]

COMMANDS:
    validate <file> [--lax]  Decode an entity and check its invariants
    normalize <file>         Decode and re-encode an entity
    wrap <file>              Emit the entity with its @context attached
    inspect <file>           Print the attribute tree
    help                     Show this help message

ENVIRONMENT:
    NGSILD_CONTEXT   Context IRI or JSON (default: NGSI-LD core context)
    NGSILD_STRICT    Strict validation, true or false (default: true)
    NGSILD_PRETTY    Pretty-print JSON output (default: false)
    RUST_LOG         Log filter (default: warn)

EXAMPLES:
    ngsild validate room.json
    cat room.json | ngsild wrap -
"#
    );
}
