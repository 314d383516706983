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

//! Binding code generation
//!
//! Turns a [`Schema`](jitbind_common::Schema) into client bindings for a
//! JIT-builder engine, in a flat C dialect and an object-oriented C++
//! dialect:
//!
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `catalog`: Per-type representation facts
//! - `layout`: Superclass-first flat struct layout
//! - `declaration`: Surface signatures per dialect
//! - `body`: Forwarding bodies in five ordered phases
//! - `writer`: Indenting source text writer
//! - `emitters`: Per-dialect rendering of headers and bodies
//! - `generator`: Main orchestrator that runs every dialect

pub mod artifact;
pub mod body;
pub mod catalog;
pub mod config;
pub mod declaration;
pub mod dialect;
pub mod emitters;
pub mod error;
pub mod generator;
pub mod layout;
pub mod writer;

// Re-export main types
pub use artifact::{Artifact, ArtifactKind, ClassArtifacts, DialectOutput};
pub use body::{Body, BodySynthesizer, FunctionContext, Phase};
pub use catalog::TypeCatalog;
pub use config::GeneratorConfig;
pub use declaration::{Declaration, DeclarationSynthesizer};
pub use dialect::Dialect;
pub use error::{GenerationError, GenerationResult};
pub use generator::{BindingGenerator, GeneratedBindings, GenerationStats};
pub use layout::{Layout, LayoutEntry, LayoutFlattener};
pub use writer::SourceWriter;
