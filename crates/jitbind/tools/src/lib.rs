//! JitBind Tools Library
//!
//! Command-line front end of the binding generator: reading API
//! descriptions and configuration files and writing generated artifacts.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

pub use cli::check::{CheckArgs, CheckSummary, run_check};
pub use cli::generate::{GenerateArgs, GenerateSummary, run_generate};
pub use config::ToolConfig;
pub use error::{ToolError, ToolResult};
pub use output::{ArtifactWriter, WriteReport};
