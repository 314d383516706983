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

//! Binding generation orchestrator
//!
//! Runs every configured dialect over a validated schema and collects the
//! artifacts with generation statistics.

use crate::artifact::DialectOutput;
use crate::catalog::TypeCatalog;
use crate::config::GeneratorConfig;
use crate::dialect::Dialect;
use crate::emitters::{DialectEmitter, EmitContext, FlatEmitter, ObjectOrientedEmitter};
use crate::error::GenerationResult;
use jitbind_common::Schema;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics about one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Number of classes per dialect
    pub class_count: usize,
    /// Number of free functions per dialect
    pub free_function_count: usize,
    /// Class member definitions across all dialects
    pub function_count: usize,
    /// Artifacts across all dialects
    pub artifact_count: usize,
    /// Total size of all artifacts
    pub total_bytes: usize,
    /// Generation time in milliseconds
    pub generation_time_ms: u64,
}

/// Generated bindings with metadata
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    /// One output per configured dialect, in configuration order
    pub outputs: Vec<DialectOutput>,
    pub stats: GenerationStats,
}

impl GeneratedBindings {
    pub fn output(&self, dialect: Dialect) -> Option<&DialectOutput> {
        self.outputs.iter().find(|o| o.dialect == dialect)
    }
}

/// Main binding generator
pub struct BindingGenerator {
    config: GeneratorConfig,
}

impl BindingGenerator {
    /// Create a new generator, rejecting an invalid configuration
    pub fn new(config: GeneratorConfig) -> GenerationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn emitter(dialect: Dialect) -> Box<dyn DialectEmitter> {
        match dialect {
            Dialect::Flat => Box::new(FlatEmitter),
            Dialect::ObjectOriented => Box::new(ObjectOrientedEmitter),
        }
    }

    /// Generate bindings for every configured dialect
    pub fn generate(&self, schema: &Schema) -> GenerationResult<GeneratedBindings> {
        let start_time = Instant::now();
        let catalog = TypeCatalog::new(schema, self.config.engine_namespace.clone());
        let mut stats = GenerationStats {
            class_count: schema.classes().len(),
            free_function_count: schema.functions().len(),
            ..Default::default()
        };

        let mut outputs = Vec::with_capacity(self.config.dialects.len());
        for &dialect in &self.config.dialects {
            debug!(%dialect, parallel = self.config.parallel, "Generating dialect");
            let context = EmitContext::new(schema, &self.config, &catalog, dialect);
            let output = Self::emitter(dialect).emit_all(&context, self.config.parallel)?;

            stats.function_count += output.classes.iter().map(|c| c.function_count).sum::<usize>();
            stats.artifact_count += output.artifacts().count();
            stats.total_bytes += output.total_bytes();
            outputs.push(output);
        }

        stats.generation_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            classes = stats.class_count,
            artifacts = stats.artifact_count,
            bytes = stats.total_bytes,
            elapsed_ms = stats.generation_time_ms,
            "Generated bindings"
        );
        Ok(GeneratedBindings { outputs, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::tests::fixture;
    use crate::error::GenerationError;

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            dialects: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(BindingGenerator::new(config), Err(GenerationError::ConfigurationError(_))));
    }

    #[test]
    fn test_generates_every_dialect() {
        let schema = fixture();
        let generated = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();

        assert_eq!(generated.outputs.len(), 2);
        assert_eq!(generated.stats.class_count, 5);
        assert_eq!(generated.stats.free_function_count, 2);
        // per dialect: two per class plus aggregate header, aggregate body and support header
        assert_eq!(generated.stats.artifact_count, 2 * (5 * 2 + 3));
        let total: usize = generated.outputs.iter().map(DialectOutput::total_bytes).sum();
        assert_eq!(generated.stats.total_bytes, total);
    }

    #[test]
    fn test_parallel_output_matches_sequential() {
        let schema = fixture();
        let sequential = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();
        let parallel = BindingGenerator::new(GeneratorConfig::parallel()).unwrap().generate(&schema).unwrap();
        assert_eq!(sequential.outputs, parallel.outputs);
    }

    #[test]
    fn test_single_dialect() {
        let schema = fixture();
        let generated = BindingGenerator::new(GeneratorConfig::for_dialect(Dialect::Flat))
            .unwrap()
            .generate(&schema)
            .unwrap();
        assert!(generated.output(Dialect::Flat).is_some());
        assert!(generated.output(Dialect::ObjectOriented).is_none());
    }
}
