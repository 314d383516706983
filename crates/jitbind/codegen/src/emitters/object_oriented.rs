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

//! Object-oriented dialect emitter
//!
//! Classes mirror the schema hierarchy with real C++ inheritance, so each
//! class declares only its own functions. Every class can adopt a backing
//! object and link itself to one; when the schema does not declare those
//! members they are generated as protected helpers for subclasses.

use super::{EmitContext, function_types, include_guard, referenced_classes, write_definition};
use crate::artifact::{Artifact, ArtifactKind, ClassArtifacts};
use crate::body::FunctionContext;
use crate::declaration::{Declaration, FREE_FUNCTION_SCOPE, check_distinct};
use crate::dialect::Dialect;
use crate::emitters::traits::DialectEmitter;
use crate::error::{GenerationError, GenerationResult};
use crate::layout::BACKING_POINTER;
use crate::writer::SourceWriter;
use jitbind_common::{Class, Field, FunctionKind, Visibility};
use std::collections::BTreeSet;

/// Members of one access section of a class declaration
#[derive(Default)]
struct Section {
    lines: Vec<String>,
}

impl Section {
    fn push(&mut self, doc: &str, line: String) {
        self.lines.extend(doc.lines().map(|l| if l.is_empty() { "//".to_string() } else { format!("// {l}") }));
        self.lines.push(line);
    }

    fn write(&self, writer: &mut SourceWriter, label: &str) {
        if self.lines.is_empty() {
            return;
        }
        writer.line(label);
        writer.indent();
        for line in &self.lines {
            writer.line(line);
        }
        writer.dedent();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectOrientedEmitter;

impl ObjectOrientedEmitter {
    fn open_namespaces(&self, context: &EmitContext<'_>, writer: &mut SourceWriter) {
        writer.line(format!("namespace {} {{", context.config.outer_namespace));
        writer.line(format!("namespace {} {{", context.config.inner_namespace));
        writer.blank();
    }

    fn close_namespaces(&self, context: &EmitContext<'_>, writer: &mut SourceWriter) {
        writer.line(format!("}} // namespace {}", context.config.inner_namespace));
        writer.line(format!("}} // namespace {}", context.config.outer_namespace));
        writer.blank();
    }

    /// Classes named by the own members of `class`
    fn referenced(&self, class: &Class) -> BTreeSet<String> {
        let fields = class.fields.iter().map(|f| &f.ty);
        let functions = class.functions.iter().flat_map(function_types);
        referenced_classes(fields.chain(functions))
    }

    fn field_declaration(&self, context: &EmitContext<'_>, field: &Field) -> GenerationResult<String> {
        let ty = context.catalog.surface_type(&field.ty, Dialect::ObjectOriented)?;
        Ok(if field.is_static {
            format!("static {ty} {};", field.name)
        } else {
            format!("{ty} {};", field.name)
        })
    }

    /// Members generated when the schema does not declare them
    fn implicit_members(&self, context: &EmitContext<'_>, class: &Class) -> GenerationResult<Vec<Declaration>> {
        let mut members = Vec::new();
        if class.creator().is_none() {
            members.push(context.declarations.adopting_constructor(class)?);
        }
        if class.find_kind(FunctionKind::Initializer).is_none() {
            members.push(context.declarations.initializer(class)?);
        }
        Ok(members)
    }

    fn header(&self, context: &EmitContext<'_>, class: &Class, referenced: &BTreeSet<String>) -> GenerationResult<Artifact> {
        let config = context.config;
        let guard = include_guard(&[&config.outer_namespace, &config.inner_namespace, &class.name]);
        let mut writer = context.writer();
        writer.line(format!("#ifndef {guard}"));
        writer.line(format!("#define {guard}"));
        writer.blank();
        writer.line("#include <stdint.h>");
        if let Some(superclass) = &class.superclass {
            writer.line(format!("#include \"{}\"", context.class_header_name(superclass)));
        }
        writer.blank();

        self.open_namespaces(context, &mut writer);
        let forward: Vec<_> = referenced
            .iter()
            .filter(|name| **name != class.name && Some(*name) != class.superclass.as_ref())
            .collect();
        for name in &forward {
            writer.line(format!("class {name};"));
        }
        if !forward.is_empty() {
            writer.blank();
        }

        let mut public = Section::default();
        let mut protected = Section::default();
        let mut declared = Vec::with_capacity(class.functions.len() + 2);
        for function in &class.functions {
            let declaration = context.declarations.declare(function, Some(class))?;
            // trampolines are free functions and dispatch through the public interface
            let section = match (function.kind, declaration.visibility) {
                (FunctionKind::Callback, _) | (_, Visibility::Public) => &mut public,
                (_, Visibility::Protected) => &mut protected,
            };
            section.push(&function.doc, declaration.prototype());
            declared.push(declaration);
        }
        if class.superclass.is_none() && class.destructor().is_none() {
            public.push("", format!("virtual ~{}() {{}}", class.name));
        }
        for field in &class.fields {
            let section = match field.visibility {
                Visibility::Public => &mut public,
                Visibility::Protected => &mut protected,
            };
            section.push("", self.field_declaration(context, field)?);
        }
        if class.superclass.is_none() {
            public.push("", format!("void * {BACKING_POINTER};"));
        }
        for member in self.implicit_members(context, class)? {
            protected.push("", member.prototype());
            declared.push(member);
        }
        check_distinct(&class.name, &declared)?;

        writer.comment(&class.doc);
        match &class.superclass {
            Some(superclass) => writer.line(format!("class {} : public {superclass} {{", class.name)),
            None => writer.line(format!("class {} {{", class.name)),
        }
        public.write(&mut writer, "public:");
        if !protected.lines.is_empty() {
            writer.blank();
        }
        protected.write(&mut writer, "protected:");
        if class.flags.has_extra_declarations {
            writer.blank();
            writer.line(format!("#include \"{}ExtrasInsideClass.hpp\"", class.name));
        }
        writer.line("};");
        writer.blank();
        self.close_namespaces(context, &mut writer);

        if class.flags.has_extra_declarations {
            writer.line(format!("#include \"{}ExtrasOutsideClass.hpp\"", class.name));
            writer.blank();
        }
        writer.line(format!("#endif // {guard}"));
        Ok(context.artifact(context.class_header_name(&class.name), ArtifactKind::ClassHeader, Some(class), writer))
    }

    fn write_body_includes(&self, context: &EmitContext<'_>, writer: &mut SourceWriter, engine: &BTreeSet<String>) {
        writer.line("#include <cstdarg>");
        writer.line("#include <cstdio>");
        writer.line("#include <cstdlib>");
        writer.blank();
        context.write_engine_includes(writer, engine);
        writer.line(format!("#include \"{}\"", context.support_header_name()));
        writer.line(format!("#include \"{}\"", context.aggregate_header_name()));
        writer.blank();
    }

    fn body(&self, context: &EmitContext<'_>, class: &Class, referenced: &BTreeSet<String>) -> GenerationResult<(Artifact, usize)> {
        let mut engine = referenced.clone();
        engine.insert(class.name.clone());

        let mut writer = context.writer();
        self.write_body_includes(context, &mut writer, &engine);
        self.open_namespaces(context, &mut writer);
        context.write_trampolines(&mut writer, class)?;

        for field in class.static_fields() {
            let ty = context.catalog.surface_type(&field.ty, Dialect::ObjectOriented)?;
            let zero = context.catalog.zero_value(&field.ty)?.ok_or_else(|| {
                GenerationError::inconsistency(format!("{}::{}", class.name, field.name), "static field has no value type")
            })?;
            writer.line(format!("{ty} {}::{} = {zero};", class.name, field.name));
            writer.blank();
        }

        let mut count = 0;
        for function in &class.functions {
            let declaration = context.declarations.declare(function, Some(class))?;
            let body = context.bodies.synthesize(&FunctionContext::own(function, class))?;
            write_definition(&mut writer, &declaration.definition(Some(&class.name)), &body);
            count += 1;
        }

        if class.creator().is_none() {
            let declaration = context.declarations.adopting_constructor(class)?;
            let body = context.bodies.adopting_constructor(class)?;
            write_definition(&mut writer, &declaration.definition(Some(&class.name)), &body);
            count += 1;
        }
        if class.find_kind(FunctionKind::Initializer).is_none() {
            let declaration = context.declarations.initializer(class)?;
            let body = context.bodies.initializer(class)?;
            write_definition(&mut writer, &declaration.definition(Some(&class.name)), &body);
            count += 1;
        }

        self.close_namespaces(context, &mut writer);
        let artifact = context.artifact(context.class_body_name(&class.name), ArtifactKind::ClassBody, Some(class), writer);
        Ok((artifact, count))
    }
}

impl DialectEmitter for ObjectOrientedEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::ObjectOriented
    }

    fn emit_class(&self, context: &EmitContext<'_>, class: &Class) -> GenerationResult<ClassArtifacts> {
        let referenced = self.referenced(class);
        let header = self.header(context, class, &referenced)?;
        let (body, function_count) = self.body(context, class, &referenced)?;
        Ok(ClassArtifacts {
            class: class.name.clone(),
            header,
            body,
            function_count,
        })
    }

    fn emit_aggregate_header(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact> {
        let config = context.config;
        let guard = include_guard(&[&config.outer_namespace, &config.inner_namespace, &config.aggregate_name]);
        let mut writer = context.writer();
        writer.line(format!("#ifndef {guard}"));
        writer.line(format!("#define {guard}"));
        writer.blank();
        for class in context.schema.classes() {
            writer.line(format!("#include \"{}\"", context.class_header_name(&class.name)));
        }
        writer.blank();

        self.open_namespaces(context, &mut writer);
        let mut declared = Vec::with_capacity(context.schema.functions().len());
        for function in context.schema.functions() {
            let declaration = context.declarations.declare(function, None)?;
            writer.comment(&function.doc);
            writer.line(declaration.prototype());
            declared.push(declaration);
        }
        check_distinct(FREE_FUNCTION_SCOPE, &declared)?;
        writer.blank();
        self.close_namespaces(context, &mut writer);
        writer.line(format!("#endif // {guard}"));
        Ok(context.artifact(context.aggregate_header_name(), ArtifactKind::AggregateHeader, None, writer))
    }

    fn emit_aggregate_body(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact> {
        let functions = context.schema.functions();
        let engine = referenced_classes(functions.iter().flat_map(function_types));

        let mut writer = context.writer();
        self.write_body_includes(context, &mut writer, &engine);
        for function in functions {
            writer.line(context.engine_free_function(function)?);
        }
        writer.blank();

        self.open_namespaces(context, &mut writer);
        for function in functions {
            let declaration = context.declarations.declare(function, None)?;
            let body = context.bodies.synthesize(&FunctionContext::free(function))?;
            write_definition(&mut writer, &declaration.definition(None), &body);
        }
        self.close_namespaces(context, &mut writer);
        Ok(context.artifact(context.aggregate_body_name(), ArtifactKind::AggregateBody, None, writer))
    }
}
