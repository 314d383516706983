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

//! Error types for binding generation

use jitbind_common::{AbstractType, SchemaError};
use thiserror::Error;

/// Errors that can occur during binding generation
///
/// All of these are fatal: they mean the schema and the type catalog have
/// drifted out of agreement, and are fixed at the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No catalog entry for type '{ty}' ({fact})")]
    CatalogMiss { ty: AbstractType, fact: &'static str },

    #[error("Schema inconsistency in {location}: {reason}")]
    SchemaInconsistency { location: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl GenerationError {
    pub fn inconsistency(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaInconsistency {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for binding generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;
