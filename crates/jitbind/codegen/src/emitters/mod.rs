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

//! Dialect emitters
//!
//! An emitter renders the schema into one dialect's artifacts:
//!
//! - `flat`: C-compatible structs and prefixed free functions
//! - `object_oriented`: C++ classes mirroring the schema hierarchy
//! - `support`: the pairing helpers both dialects include
//!
//! Emitters share an [`EmitContext`] holding the synthesizers for their
//! dialect. It is read-only, so classes can be emitted in parallel.

pub mod flat;
pub mod object_oriented;
pub mod support;
pub mod traits;

pub use flat::FlatEmitter;
pub use object_oriented::ObjectOrientedEmitter;
pub use traits::DialectEmitter;

use crate::artifact::{Artifact, ArtifactKind};
use crate::body::{Body, BodySynthesizer, pointer_to};
use crate::catalog::TypeCatalog;
use crate::config::GeneratorConfig;
use crate::declaration::DeclarationSynthesizer;
use crate::dialect::Dialect;
use crate::error::GenerationResult;
use crate::layout::LayoutFlattener;
use crate::writer::SourceWriter;
use jitbind_common::{AbstractType, Class, Function, Schema};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Everything an emitter reads while rendering one dialect
pub struct EmitContext<'a> {
    pub schema: &'a Schema,
    pub config: &'a GeneratorConfig,
    pub catalog: &'a TypeCatalog,
    pub dialect: Dialect,
    pub layouts: LayoutFlattener<'a>,
    pub declarations: DeclarationSynthesizer<'a>,
    pub bodies: BodySynthesizer<'a>,
}

impl<'a> EmitContext<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig, catalog: &'a TypeCatalog, dialect: Dialect) -> Self {
        Self {
            schema,
            config,
            catalog,
            dialect,
            layouts: LayoutFlattener::new(schema),
            declarations: DeclarationSynthesizer::new(catalog, dialect),
            bodies: BodySynthesizer::new(schema, catalog, config, dialect),
        }
    }

    /// Fresh writer with the banner already written
    pub fn writer(&self) -> SourceWriter {
        let mut writer = SourceWriter::new(self.config.indent_width);
        writer.comment(&self.config.banner);
        writer.blank();
        writer
    }

    pub fn class_header_name(&self, class: &str) -> String {
        format!("{class}.{}", self.dialect.header_extension())
    }

    pub fn class_body_name(&self, class: &str) -> String {
        format!("{class}.{}", self.dialect.body_extension())
    }

    pub fn aggregate_header_name(&self) -> String {
        self.class_header_name(&self.config.aggregate_name)
    }

    pub fn aggregate_body_name(&self) -> String {
        self.class_body_name(&self.config.aggregate_name)
    }

    pub fn support_header_name(&self) -> String {
        format!("{}.hpp", self.config.support_header_name)
    }

    /// Wrap a finished writer into an artifact under the dialect directory
    pub fn artifact(&self, file_name: String, kind: ArtifactKind, owner: Option<&Class>, writer: SourceWriter) -> Artifact {
        Artifact {
            path: PathBuf::from(self.dialect.directory()).join(file_name),
            kind,
            dialect: self.dialect,
            owner: owner.map(|c| c.name.clone()),
            contents: writer.into_string(),
        }
    }

    /// `#include` lines of the engine headers for `classes`
    pub fn write_engine_includes<'c>(&self, writer: &mut SourceWriter, classes: impl IntoIterator<Item = &'c String>) {
        for class in classes {
            writer.line(format!("#include \"{}\"", self.config.engine_header(class)));
        }
    }

    /// Trampolines registered by `class`, as file-local functions
    pub fn write_trampolines(&self, writer: &mut SourceWriter, class: &Class) -> GenerationResult<()> {
        for trampoline in self.bodies.trampolines(class)? {
            let declaration = self.declarations.trampoline(trampoline.class, trampoline.callback)?;
            let body = self.bodies.trampoline_body(&trampoline)?;
            write_definition(writer, &format!("static {}", declaration.definition(None)), &body);
        }
        Ok(())
    }

    /// `extern "C"` prototype of the engine function behind a free function
    pub fn engine_free_function(&self, function: &Function) -> GenerationResult<String> {
        let mut params = Vec::with_capacity(function.parameters.len());
        for parameter in function.fixed_parameters() {
            params.push(format!("{} {}", self.catalog.engine_type(&parameter.ty)?, parameter.name));
        }
        for parameter in function.group_parameters() {
            // repeated values arrive as one array per group parameter
            let engine = match &parameter.ty {
                AbstractType::ObjectRef(_) => self.catalog.engine_type(&parameter.ty)?,
                ty => pointer_to(&self.catalog.engine_type(ty)?),
            };
            params.push(format!("{engine} {}", parameter.name));
        }
        Ok(format!(
            "extern \"C\" {} {}{}({});",
            self.catalog.engine_type(&function.return_type)?,
            self.config.free_function_prefix,
            function.name,
            params.join(", ")
        ))
    }
}

/// `name` followed by `{ body }` with an optional initializer list
pub fn write_definition(writer: &mut SourceWriter, header: &str, body: &Body) {
    writer.line(header);
    if let Some(initializers) = &body.initializer_list {
        writer.line_at(writer.depth() + 1, format!(": {initializers}"));
    }
    writer.open("");
    body.write_to(writer);
    writer.close("");
    writer.blank();
}

/// `#ifndef` guard macro for a header
pub fn include_guard(parts: &[&str]) -> String {
    let mut guard = parts.iter().map(|p| p.to_uppercase()).collect::<Vec<_>>().join("_");
    guard.push_str("_INCLUDED");
    guard
}

/// Classes named by `types`, sorted
pub fn referenced_classes<'t>(types: impl IntoIterator<Item = &'t AbstractType>) -> BTreeSet<String> {
    types.into_iter().filter_map(|ty| ty.class_name()).map(str::to_string).collect()
}

/// Return and parameter types of `function`
pub fn function_types(function: &Function) -> impl Iterator<Item = &AbstractType> {
    std::iter::once(&function.return_type).chain(function.parameters.iter().map(|p| &p.ty))
}
