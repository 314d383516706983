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

//! JitBind schema model
//!
//! This crate holds the read-only description of the API that bindings are
//! generated for:
//!
//! - `types`: abstract API types and their textual notation
//! - `function`: functions, parameters, kinds and modifiers
//! - `class`: classes and fields
//! - `schema`: the assembled schema and its builder
//! - `validate`: structural checks run when a schema is built
//! - `description`: JSON API descriptions
//! - `error`: schema error types

pub mod class;
pub mod description;
pub mod error;
pub mod function;
pub mod schema;
pub mod types;
pub mod validate;

pub use class::{Class, ClassFlags, Field};
pub use description::ApiDescription;
pub use error::{SchemaError, SchemaResult};
pub use function::{Function, FunctionKind, FunctionModifiers, MAX_PARAMETERS, Parameter, Visibility, sentinel};
pub use schema::{Schema, SchemaBuilder, SurfaceFunction};
pub use types::AbstractType;
