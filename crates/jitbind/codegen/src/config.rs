// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Configuration for binding generation

use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use serde::{Deserialize, Serialize};

/// Configuration for binding generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Dialects to generate, in output order
    pub dialects: Vec<Dialect>,

    /// Outer namespace of the object-oriented dialect
    pub outer_namespace: String,

    /// Inner namespace of the object-oriented dialect
    pub inner_namespace: String,

    /// Namespace of the engine classes
    pub engine_namespace: String,

    /// Engine header path, `{name}` is replaced by the class name
    pub engine_header_pattern: String,

    /// Prefix of engine free functions
    pub free_function_prefix: String,

    /// Base name of the aggregate header and body
    pub aggregate_name: String,

    /// Base name of the pairing support header
    pub support_header_name: String,

    /// Spaces per indentation level
    pub indent_width: usize,

    /// Generate classes on the rayon thread pool
    pub parallel: bool,

    /// First comment line of every artifact
    pub banner: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialects: Dialect::ALL.to_vec(),
            outer_namespace: "OMR".to_string(),
            inner_namespace: "JitBuilder".to_string(),
            engine_namespace: "TR".to_string(),
            engine_header_pattern: "ilgen/{name}.hpp".to_string(),
            free_function_prefix: "internal_".to_string(),
            aggregate_name: "JitBuilder".to_string(),
            support_header_name: "BindingSupport".to_string(),
            indent_width: 4,
            parallel: false,
            banner: "Generated by jitbind. Do not edit.".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration generating a single dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialects: vec![dialect],
            ..Default::default()
        }
    }

    /// Create a configuration generating classes in parallel
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Default::default()
        }
    }

    /// Fully qualified client namespace of the object-oriented dialect
    pub fn client_namespace(&self) -> String {
        format!("{}::{}", self.outer_namespace, self.inner_namespace)
    }

    /// Engine header for a class
    pub fn engine_header(&self, class: &str) -> String {
        self.engine_header_pattern.replace("{name}", class)
    }

    /// Validate the configuration
    pub fn validate(&self) -> GenerationResult<()> {
        if self.dialects.is_empty() {
            return Err(GenerationError::ConfigurationError("At least one dialect must be selected".to_string()));
        }

        for (i, dialect) in self.dialects.iter().enumerate() {
            if self.dialects[..i].contains(dialect) {
                return Err(GenerationError::ConfigurationError(format!("Dialect {dialect} selected twice")));
            }
        }

        let identifiers = [
            ("outer_namespace", &self.outer_namespace),
            ("inner_namespace", &self.inner_namespace),
            ("engine_namespace", &self.engine_namespace),
            ("aggregate_name", &self.aggregate_name),
            ("support_header_name", &self.support_header_name),
        ];
        for (key, value) in identifiers {
            if !is_identifier(value) {
                return Err(GenerationError::ConfigurationError(format!("{key} must be an identifier, got '{value}'")));
            }
        }

        if !self.free_function_prefix.is_empty() && !is_identifier(&self.free_function_prefix) {
            return Err(GenerationError::ConfigurationError(format!(
                "free_function_prefix must be an identifier prefix, got '{}'",
                self.free_function_prefix
            )));
        }

        if !self.engine_header_pattern.contains("{name}") {
            return Err(GenerationError::ConfigurationError("engine_header_pattern must contain {name}".to_string()));
        }

        if self.indent_width == 0 || self.indent_width > 8 {
            return Err(GenerationError::ConfigurationError("Indent width must be between 1 and 8".to_string()));
        }

        Ok(())
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}
