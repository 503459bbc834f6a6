//! Library side of the `ngsild` command-line tool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod config;

pub use config::CliConfig;
