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

//! Error types for schema construction

use thiserror::Error;

/// Errors raised while describing or assembling a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid type notation '{notation}': {reason}")]
    InvalidType { notation: String, reason: String },

    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    #[error("Class {class} extends unknown class {superclass}")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("Inheritance cycle through class {0}")]
    InheritanceCycle(String),

    #[error("Invalid class {class}: {reason}")]
    InvalidClass { class: String, reason: String },

    #[error("Duplicate function {name} in {owner}")]
    DuplicateFunction { owner: String, name: String },

    #[error("Function {name} of {ancestor} surfaces again in {class}; flag the inherited declaration as overridden")]
    InheritedFunctionClash { class: String, ancestor: String, name: String },

    #[error("Invalid function {owner}::{function}: {reason}")]
    InvalidFunction { owner: String, function: String, reason: String },

    #[error("Description error: {0}")]
    Description(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
