//! Check command
//!
//! Validates an API description and runs generation in memory, so catalog
//! misses and schema inconsistencies surface without writing anything.

use super::load_schema;
use crate::error::ToolResult;
use clap::Args;
use jitbind_codegen::{BindingGenerator, GeneratorConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// JSON API description
    #[arg(long, value_name = "JSON")]
    pub api: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub classes: usize,
    pub free_functions: usize,
    pub member_functions: usize,
    pub callbacks: usize,
    pub artifacts: usize,
}

impl CheckSummary {
    pub fn to_json(&self) -> ToolResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Execute the check command
pub fn run_check(args: &CheckArgs) -> ToolResult<CheckSummary> {
    let schema = load_schema(&args.api)?;
    let generated = BindingGenerator::new(GeneratorConfig::default())?.generate(&schema)?;

    let classes = schema.classes();
    Ok(CheckSummary {
        classes: classes.len(),
        free_functions: schema.functions().len(),
        member_functions: classes.iter().map(|c| c.functions.len()).sum(),
        callbacks: classes.iter().map(|c| c.callbacks().count()).sum(),
        artifacts: generated.stats.artifact_count,
    })
}
