//! Generate command

use super::{DialectArg, load_schema};
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use crate::output::{ArtifactWriter, WriteReport};
use clap::Args;
use jitbind_codegen::{BindingGenerator, GenerationStats, GeneratorConfig};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the generate command
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// JSON API description
    #[arg(long, value_name = "JSON")]
    pub api: PathBuf,

    /// Output directory; each dialect writes into its own subdirectory
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Dialects to generate, overriding the configuration
    #[arg(short, long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Generate classes in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Debug)]
pub struct GenerateSummary {
    pub stats: GenerationStats,
    pub report: WriteReport,
}

impl GenerateArgs {
    /// Configuration file settings with command line overrides applied
    pub fn resolve_config(&self) -> ToolResult<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => ToolConfig::load_from_file(path)?.generator,
            None => GeneratorConfig::default(),
        };
        if let Some(dialect) = self.dialect {
            config.dialects = dialect.dialects();
        }
        if self.parallel {
            config.parallel = true;
        }
        Ok(config)
    }
}

/// Execute the generate command
pub fn run_generate(args: &GenerateArgs) -> ToolResult<GenerateSummary> {
    let config = args.resolve_config()?;
    let schema = load_schema(&args.api)?;
    let generated = BindingGenerator::new(config)?.generate(&schema)?;

    let writer = ArtifactWriter::new(&args.out);
    let mut report = WriteReport::default();
    for output in &generated.outputs {
        report.merge(writer.write_output(output));
    }

    if !report.is_success() {
        return Err(ToolError::Write(report.failed_units()));
    }
    info!(out = %args.out.display(), artifacts = report.written.len(), "Wrote bindings");
    Ok(GenerateSummary {
        stats: generated.stats,
        report,
    })
}
