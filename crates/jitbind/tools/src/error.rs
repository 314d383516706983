//! Error types for the jitbind tools

use jitbind_codegen::GenerationError;
use jitbind_common::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid API description: {0}")]
    Schema(#[from] SchemaError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to write artifacts for {}", .0.join(", "))]
    Write(Vec<String>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;
