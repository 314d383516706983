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

//! Parameter preparation and recovery

use super::{Body, BodySynthesizer, FunctionContext, Phase, SUPPORT_NAMESPACE, pointer_to};
use crate::error::{GenerationError, GenerationResult};
use jitbind_common::{AbstractType, Parameter};

/// Index of the count parameter for the array parameter at `index`.
///
/// Scans left over contiguous array-typed parameters; the first non-array
/// parameter is the count and must be an integer.
pub fn find_count_parameter(parameters: &[Parameter], index: usize) -> Option<usize> {
    parameters[..index.min(parameters.len())]
        .iter()
        .rposition(|p| !p.ty.is_array())
        .filter(|&position| parameters[position].ty.is_integer())
}

impl BodySynthesizer<'_> {
    /// Emit preparation and recovery for every parameter and return the
    /// engine argument list
    pub(super) fn marshal_parameters(&self, context: &FunctionContext<'_>, body: &mut Body) -> GenerationResult<Vec<String>> {
        let function = context.function;
        let mut args = Vec::with_capacity(function.parameters.len());

        for (index, parameter) in function.fixed_parameters().iter().enumerate() {
            let name = &parameter.name;
            match &parameter.ty {
                AbstractType::ObjectRef(_) => {
                    self.by_reference(parameter, body)?;
                    args.push(format!("{name}Arg"));
                }
                AbstractType::ObjectArray(_) | AbstractType::ObjectRefArray(_) => {
                    let count = find_count_parameter(&function.parameters, index).ok_or_else(|| {
                        GenerationError::inconsistency(context.location(), format!("array parameter {name} has no count parameter"))
                    })?;
                    self.object_array(parameter, &function.parameters[count], body)?;
                    args.push(format!("{name}Arg"));
                }
                ty => args.push(self.engine_value(ty, name)?),
            }
        }

        if let Some(position) = function.varargs_position() {
            args.extend(self.variadic_group(context, position, body)?);
        }
        Ok(args)
    }

    /// `&K`: pass the address of a local backing pointer, write back on redirection
    fn by_reference(&self, parameter: &Parameter, body: &mut Body) -> GenerationResult<()> {
        let name = &parameter.name;
        let element = AbstractType::object(self.catalog.bare_name(&parameter.ty)?);
        let engine = self.catalog.engine_type(&element)?;
        let cast = self.catalog.boundary_cast(&element)?;

        let prepare = body.block_mut(Phase::Prepare);
        prepare.line(format!("{engine} {name}Impl = {name} != NULL ? {cast}({SUPPORT_NAMESPACE}::implOf(*{name})) : NULL;"));
        prepare.line(format!("{engine} {name}Orig = {name}Impl;"));
        prepare.line(format!("{} {name}Arg = {name} != NULL ? &{name}Impl : NULL;", pointer_to(&engine)));

        // an untouched target keeps the caller's wrapper
        let client_of = self.client_of(&element)?;
        let recover = body.block_mut(Phase::Recover);
        recover.line(format!("if ({name} != NULL && {name}Impl != {name}Orig)"));
        recover.nested(1, format!("*{name} = {client_of}({name}Impl);"));
        Ok(())
    }

    /// `[K]` and `[&K]`: marshal element-wise into a heap array of backing pointers
    fn object_array(&self, parameter: &Parameter, count: &Parameter, body: &mut Body) -> GenerationResult<()> {
        let name = &parameter.name;
        let count_type = self.catalog.surface_type(&count.ty, self.dialect)?;
        let count = &count.name;
        let element = AbstractType::object(self.catalog.bare_name(&parameter.ty)?);
        let engine = self.catalog.engine_type(&element)?;
        let loop_header = format!("for ({count_type} i = 0; i < {count}; i++)");

        let prepare = body.block_mut(Phase::Prepare);
        prepare.line(format!("{} {name}Arg = new {engine}[{count}];", pointer_to(&engine)));
        prepare.line(&loop_header);
        prepare.nested(1, format!("{name}Arg[i] = {};", self.engine_value(&element, &format!("{name}[i]"))?));

        let client_of = self.client_of(&element)?;
        let recover = body.block_mut(Phase::Recover);
        if matches!(parameter.ty, AbstractType::ObjectRefArray(_)) {
            recover.line(&loop_header);
            recover.nested(1, format!("{name}[i] = {client_of}({name}Arg[i]);"));
        }
        recover.line(format!("delete[] {name}Arg;"));
        Ok(())
    }

    /// `...`: one heap array per group parameter, filled from a `va_list`
    fn variadic_group(&self, context: &FunctionContext<'_>, position: usize, body: &mut Body) -> GenerationResult<Vec<String>> {
        let function = context.function;
        let count = &function.parameters[position - 1];
        // va_start needs a parameter whose type survives default promotion
        if !matches!(count.ty, AbstractType::Int32 | AbstractType::Int64) {
            return Err(GenerationError::inconsistency(
                context.location(),
                format!("variadic count parameter {} must be int32 or int64", count.name),
            ));
        }
        let count_type = self.catalog.surface_type(&count.ty, self.dialect)?;
        let count = &count.name;
        let loop_header = format!("for ({count_type} i = 0; i < {count}; i++)");

        let mut allocations = Vec::new();
        let mut extraction = Vec::new();
        let mut write_back = Vec::new();
        let mut frees = Vec::new();
        let mut args = Vec::new();

        for parameter in function.group_parameters() {
            let name = &parameter.name;
            match &parameter.ty {
                AbstractType::ObjectRef(_) => {
                    let element = AbstractType::object(self.catalog.bare_name(&parameter.ty)?);
                    let engine = self.catalog.engine_type(&element)?;
                    let surface = self.catalog.surface_type(&parameter.ty, self.dialect)?;
                    let vararg = self.catalog.vararg_type(&parameter.ty, self.dialect)?;

                    allocations.push(format!("{} {name}Refs = new {surface}[{count}];", pointer_to(&surface)));
                    allocations.push(format!("{} {name}Arg = new {engine}[{count}];", pointer_to(&engine)));
                    extraction.push(format!("{name}Refs[i] = va_arg(vararg, {vararg});"));
                    extraction.push(format!(
                        "{name}Arg[i] = {name}Refs[i] != NULL ? {} : NULL;",
                        self.engine_value(&element, &format!("*{name}Refs[i]"))?
                    ));
                    write_back.push((
                        1,
                        format!("if ({name}Refs[i] != NULL && {name}Arg[i] != {SUPPORT_NAMESPACE}::implOf(*{name}Refs[i]))"),
                    ));
                    write_back.push((2, format!("*{name}Refs[i] = {}({name}Arg[i]);", self.client_of(&element)?)));
                    frees.push(format!("delete[] {name}Refs;"));
                }
                ty if ty.is_array() || ty.is_varargs() || ty.is_void() => {
                    return Err(GenerationError::inconsistency(
                        context.location(),
                        format!("group parameter {name} of type {ty} cannot be repeated"),
                    ));
                }
                ty => {
                    let engine = self.catalog.engine_type(ty)?;
                    let vararg = self.catalog.vararg_type(ty, self.dialect)?;
                    allocations.push(format!("{} {name}Arg = new {engine}[{count}];", pointer_to(&engine)));
                    extraction.push(format!("{name}Arg[i] = {};", self.engine_value(ty, &format!("va_arg(vararg, {vararg})"))?));
                }
            }
            frees.push(format!("delete[] {name}Arg;"));
            args.push(format!("{name}Arg"));
        }

        let prepare = body.block_mut(Phase::Prepare);
        for line in allocations {
            prepare.line(line);
        }
        prepare.line("va_list vararg;");
        prepare.line(format!("va_start(vararg, {count});"));
        prepare.line(format!("{loop_header} {{"));
        for line in extraction {
            prepare.nested(1, line);
        }
        prepare.line("}");
        prepare.line("va_end(vararg);");

        let recover = body.block_mut(Phase::Recover);
        if !write_back.is_empty() {
            recover.line(format!("{loop_header} {{"));
            for (depth, line) in write_back {
                recover.nested(depth, line);
            }
            recover.line("}");
        }
        for line in frees {
            recover.line(line);
        }
        Ok(args)
    }
}
