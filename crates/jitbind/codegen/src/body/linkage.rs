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

//! Identity linking and destruction
//!
//! Constructors, creators, value constructors and initializers end in the
//! link phase: the wrapper is allocated (flat) or is `this` (object
//! oriented), fields assigned at construction are resolved from the backing
//! object, the backing pointer is stored, the pairing is registered with the
//! engine and callback trampolines are installed.

use super::callback::trampoline_registration;
use super::{BACKING, Body, BodySynthesizer, FunctionContext, Phase, SUPPORT_NAMESPACE};
use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use crate::layout::{BACKING_POINTER, LayoutEntry};
use jitbind_common::{Class, Field, FunctionKind};

/// Wrapper local of flat linking bodies
const WRAPPER: &str = "obj";

impl BodySynthesizer<'_> {
    /// Arguments of a constructor call; constructors take no marshalled parameters
    fn constructor_arguments(&self, context: &FunctionContext<'_>) -> GenerationResult<Vec<String>> {
        let function = context.function;
        if let Some(parameter) = function.parameters.iter().find(|p| p.ty.needs_marshalling()) {
            return Err(GenerationError::inconsistency(
                context.location(),
                format!("constructor parameter {} of type {} cannot be marshalled", parameter.name, parameter.ty),
            ));
        }
        function.parameters.iter().map(|p| self.engine_value(&p.ty, &p.name)).collect()
    }

    /// `new TR::Class(args)`
    fn new_backing_object(&self, context: &FunctionContext<'_>, class: &Class) -> GenerationResult<String> {
        let args = self.constructor_arguments(context)?;
        Ok(format!("new {}({})", self.engine_class(&class.name), args.join(", ")))
    }

    /// `TR::Class * implObj = <expr>;`
    fn bind_backing(&self, class: &Class, expr: &str) -> String {
        format!("{} * {BACKING} = {expr};", self.engine_class(&class.name))
    }

    fn adopt_backing(&self, class: &Class, expr: &str) -> String {
        self.bind_backing(class, &format!("static_cast<{} *>({expr})", self.engine_class(&class.name)))
    }

    pub(super) fn constructor(&self, context: &FunctionContext<'_>) -> GenerationResult<Body> {
        let class = context.owner_or_err()?;
        let construction = self.new_backing_object(context, class)?;
        let mut body = Body::default();

        match self.dialect {
            Dialect::Flat => {
                body.block_mut(Phase::Invoke).line(self.bind_backing(class, &construction));
                self.link_flat(class, &mut body, true)?;
            }
            // the backing object is built once and handed up the superclass chain
            Dialect::ObjectOriented => match &class.superclass {
                Some(superclass) => {
                    body.initializer_list = Some(format!("{superclass}(static_cast<void *>({construction}))"));
                    body.block_mut(Phase::Link).line(format!("initializeFromImpl({BACKING_POINTER});"));
                }
                None => {
                    body.block_mut(Phase::Invoke).line(self.bind_backing(class, &construction));
                    body.block_mut(Phase::Link)
                        .line(format!("initializeFromImpl(static_cast<void *>({BACKING}));"));
                }
            },
        }
        Ok(body)
    }

    pub(super) fn value_constructor(&self, context: &FunctionContext<'_>) -> GenerationResult<Body> {
        let class = context.owner_or_err()?;
        let construction = self.new_backing_object(context, class)?;
        let mut body = Body::default();
        body.block_mut(Phase::Invoke).line(self.bind_backing(class, &construction));

        match self.dialect {
            Dialect::Flat => self.link_flat(class, &mut body, true)?,
            Dialect::ObjectOriented => body
                .block_mut(Phase::Link)
                .line(format!("return new {}(static_cast<void *>({BACKING}));", class.name)),
        }
        Ok(body)
    }

    /// Creator: wrap a backing object the engine already built
    pub fn adopting_constructor(&self, class: &Class) -> GenerationResult<Body> {
        let mut body = Body::default();
        match self.dialect {
            Dialect::Flat => {
                body.block_mut(Phase::Invoke).line(self.adopt_backing(class, "impl"));
                self.link_flat(class, &mut body, true)?;
            }
            Dialect::ObjectOriented => {
                if let Some(superclass) = &class.superclass {
                    body.initializer_list = Some(format!("{superclass}(impl)"));
                }
                body.block_mut(Phase::Link).line("initializeFromImpl(impl);");
            }
        }
        Ok(body)
    }

    /// Initializer: link an existing wrapper to a backing object
    pub fn initializer(&self, class: &Class) -> GenerationResult<Body> {
        let mut body = Body::default();
        body.block_mut(Phase::Invoke).line(self.adopt_backing(class, "impl"));
        match self.dialect {
            Dialect::Flat => self.link_flat(class, &mut body, false)?,
            Dialect::ObjectOriented => self.link_object(class, &mut body)?,
        }
        Ok(body)
    }

    /// Flat linking over the whole flattened layout
    fn link_flat(&self, class: &Class, body: &mut Body, allocate: bool) -> GenerationResult<()> {
        let layout = self.flattener.flatten(class)?;
        let target = if allocate { WRAPPER } else { "self" };

        let mut lines = Vec::new();
        if allocate {
            lines.push((0, format!("{0} * {WRAPPER} = static_cast<{0} *>(calloc(1, sizeof({0})));", class.name)));
            lines.push((0, format!("if ({WRAPPER} == NULL)")));
            lines.push((1, "abort();".to_string()));
        }

        for entry in layout.entries() {
            if let LayoutEntry::Field { owner, name, .. } = entry {
                let field = self.layout_field(owner, name)?;
                if field.assign_at_construction {
                    lines.push((0, self.assign_field(class, field, &format!("{target}->{name}"))?));
                }
            }
        }

        lines.push((0, format!("{target}->{BACKING_POINTER} = static_cast<void *>({BACKING});")));
        lines.push((0, format!("{SUPPORT_NAMESPACE}::pairWith({BACKING}, {target});")));
        for entry in layout.callback_slots() {
            lines.push((0, trampoline_registration(class, entry.name())));
        }
        if allocate {
            lines.push((0, format!("return {WRAPPER};")));
        }

        let link = body.block_mut(Phase::Link);
        for (depth, line) in lines {
            link.nested(depth, line);
        }
        Ok(())
    }

    /// Object-oriented linking of the class's own members; ancestors link
    /// theirs in their own `initializeFromImpl`
    fn link_object(&self, class: &Class, body: &mut Body) -> GenerationResult<()> {
        let mut lines = Vec::new();
        for field in class.instance_fields().filter(|f| f.assign_at_construction) {
            lines.push(self.assign_field(class, field, &field.name)?);
        }
        lines.push(format!("{BACKING_POINTER} = impl;"));
        lines.push(format!("{SUPPORT_NAMESPACE}::pairWith({BACKING}, this);"));
        for callback in class.callbacks() {
            lines.push(trampoline_registration(class, &callback.name));
        }

        let link = body.block_mut(Phase::Link);
        for line in lines {
            link.line(line);
        }
        Ok(())
    }

    fn layout_field(&self, owner: &str, name: &str) -> GenerationResult<&Field> {
        self.schema
            .class(owner)
            .and_then(|class| class.fields.iter().find(|f| f.name == name))
            .ok_or_else(|| GenerationError::inconsistency(format!("{owner}::{name}"), "layout field not found in schema"))
    }

    /// `<lvalue> = <field resolved from the backing object>;`
    fn assign_field(&self, class: &Class, field: &Field, lvalue: &str) -> GenerationResult<String> {
        if field.ty.needs_marshalling() || field.ty.is_void() {
            return Err(GenerationError::inconsistency(
                format!("{}::{}", class.name, field.name),
                format!("field of type {} cannot be assigned at construction", field.ty),
            ));
        }
        let value = self.surface_value(&field.ty, &format!("{BACKING}->{}", field.name))?;
        Ok(format!("{lvalue} = {value};"))
    }

    pub(super) fn destructor(&self, class: &Class) -> GenerationResult<Body> {
        let mut body = Body::default();
        let engine = self.engine_class(&class.name);
        match self.dialect {
            Dialect::Flat => {
                let invoke = body.block_mut(Phase::Invoke);
                invoke.line("if (self == NULL)");
                invoke.nested(1, "return;");
                invoke.line(format!("delete static_cast<{engine} *>(self->{BACKING_POINTER});"));
                invoke.line("free(self);");
            }
            Dialect::ObjectOriented => {
                // one backing object serves the whole chain; only the topmost
                // declaring destructor releases it
                let inherited = self.schema.ancestors(class).any(|c| c.find_kind(FunctionKind::Destructor).is_some());
                if !inherited {
                    body.block_mut(Phase::Invoke)
                        .line(format!("delete static_cast<{engine} *>({BACKING_POINTER});"));
                }
            }
        }
        Ok(body)
    }
}
