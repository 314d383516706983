//! CLI subcommands

pub mod check;
pub mod generate;

use crate::error::{ToolError, ToolResult};
use clap::ValueEnum;
use jitbind_codegen::Dialect;
use jitbind_common::{ApiDescription, Schema};
use std::path::Path;
use tracing::debug;

/// Dialect selection for CLI
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Flat,
    Oo,
    Both,
}

impl DialectArg {
    pub fn dialects(self) -> Vec<Dialect> {
        match self {
            DialectArg::Flat => vec![Dialect::Flat],
            DialectArg::Oo => vec![Dialect::ObjectOriented],
            DialectArg::Both => Dialect::ALL.to_vec(),
        }
    }
}

/// Read a JSON API description and build its validated schema
pub fn load_schema(path: &Path) -> ToolResult<Schema> {
    let text = std::fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = ApiDescription::from_json(&text)?.into_schema()?;
    debug!(path = %path.display(), classes = schema.classes().len(), "Loaded API description");
    Ok(schema)
}
