//! Configuration file handling
//!
//! The generator reads an optional TOML file with a `[generator]` table;
//! every key defaults to [`GeneratorConfig::default`].
//!
//! ```toml
//! [generator]
//! dialects = ["flat"]
//! outer_namespace = "OMR"
//! parallel = true
//! ```

use crate::error::{ToolError, ToolResult};
use jitbind_codegen::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub generator: GeneratorConfig,
}

impl ToolConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> ToolResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ToolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| ToolError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
