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

//! Body synthesis
//!
//! Every forwarding body is built in five ordered phases:
//!
//! 1. `Prepare`: marshal by-reference, array and variadic parameters
//! 2. `Invoke`: call into the engine, or build/adopt the backing object
//! 3. `Recover`: write redirected references back and free temporaries
//! 4. `Return`: translate the engine result to the surface
//! 5. `Link`: pair a new wrapper with its backing object
//!
//! Submodules hold the phase logic: `marshal` for parameters, `linkage` for
//! the identity-linking kinds and destructors, `callback` for trampolines.

mod callback;
mod linkage;
mod marshal;

pub use callback::Trampoline;
pub use marshal::find_count_parameter;

use crate::catalog::TypeCatalog;
use crate::config::GeneratorConfig;
use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use crate::layout::LayoutFlattener;
use crate::writer::SourceWriter;
use jitbind_common::{AbstractType, Class, Function, FunctionKind, Schema, SurfaceFunction};

/// Namespace of the generated pairing helpers
pub const SUPPORT_NAMESPACE: &str = "JitBind";

/// Local holding the engine result
const RESULT: &str = "implRet";

/// Local holding the backing object of a linked wrapper
const BACKING: &str = "implObj";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Prepare,
    Invoke,
    Recover,
    Return,
    Link,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [Phase::Prepare, Phase::Invoke, Phase::Recover, Phase::Return, Phase::Link];
}

/// One statement line, indented relative to the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub text: String,
}

/// Lines of one phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub phase: Phase,
    pub lines: Vec<Line>,
}

impl Block {
    fn new(phase: Phase) -> Self {
        Self { phase, lines: Vec::new() }
    }

    pub(crate) fn line(&mut self, text: impl Into<String>) {
        self.nested(0, text);
    }

    pub(crate) fn nested(&mut self, depth: usize, text: impl Into<String>) {
        self.lines.push(Line { depth, text: text.into() });
    }
}

/// A synthesized function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// Constructor initializer list, without the leading colon
    pub initializer_list: Option<String>,
    pub blocks: Vec<Block>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            initializer_list: None,
            blocks: Phase::ORDER.iter().map(|&phase| Block::new(phase)).collect(),
        }
    }
}

impl Body {
    pub fn block(&self, phase: Phase) -> &Block {
        &self.blocks[phase as usize]
    }

    pub(crate) fn block_mut(&mut self, phase: Phase) -> &mut Block {
        &mut self.blocks[phase as usize]
    }

    /// Phases that emitted at least one line, in emission order
    pub fn phases(&self) -> Vec<Phase> {
        self.blocks.iter().filter(|b| !b.lines.is_empty()).map(|b| b.phase).collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }

    /// Statements at the writer's current depth, blocks separated by nothing
    pub fn write_to(&self, writer: &mut SourceWriter) {
        let base = writer.depth();
        for line in self.lines() {
            writer.line_at(base + line.depth, &line.text);
        }
    }

    /// Body text with four-space relative indentation
    pub fn text(&self) -> String {
        let mut writer = SourceWriter::new(4);
        self.write_to(&mut writer);
        writer.into_string()
    }
}

/// The function a body is synthesized for, and where it surfaces
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'a> {
    pub function: &'a Function,
    /// Surface class, absent for free functions
    pub owner: Option<&'a Class>,
    pub declared_in: Option<&'a Class>,
}

impl<'a> FunctionContext<'a> {
    pub fn member(surface: SurfaceFunction<'a>, owner: &'a Class) -> Self {
        Self {
            function: surface.function,
            owner: Some(owner),
            declared_in: Some(surface.declared_in),
        }
    }

    pub fn own(function: &'a Function, owner: &'a Class) -> Self {
        Self {
            function,
            owner: Some(owner),
            declared_in: Some(owner),
        }
    }

    pub fn free(function: &'a Function) -> Self {
        Self {
            function,
            owner: None,
            declared_in: None,
        }
    }

    /// `Class::function` or the bare free-function name, for diagnostics
    pub fn location(&self) -> String {
        match self.owner {
            Some(owner) => format!("{}::{}", owner.name, self.function.name),
            None => self.function.name.clone(),
        }
    }

    fn owner_or_err(&self) -> GenerationResult<&'a Class> {
        self.owner
            .ok_or_else(|| GenerationError::inconsistency(self.location(), "member function without an owning class"))
    }
}

/// Builds forwarding bodies for one dialect
pub struct BodySynthesizer<'a> {
    schema: &'a Schema,
    catalog: &'a TypeCatalog,
    flattener: LayoutFlattener<'a>,
    dialect: Dialect,
    engine_namespace: &'a str,
    free_function_prefix: &'a str,
}

impl<'a> BodySynthesizer<'a> {
    pub fn new(schema: &'a Schema, catalog: &'a TypeCatalog, config: &'a GeneratorConfig, dialect: Dialect) -> Self {
        Self {
            schema,
            catalog,
            flattener: LayoutFlattener::new(schema),
            dialect,
            engine_namespace: &config.engine_namespace,
            free_function_prefix: &config.free_function_prefix,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Body of a surface function
    pub fn synthesize(&self, context: &FunctionContext<'_>) -> GenerationResult<Body> {
        match context.function.kind {
            FunctionKind::Ordinary => self.forwarding(context),
            FunctionKind::Constructor => self.constructor(context),
            FunctionKind::Creator => self.adopting_constructor(context.owner_or_err()?),
            FunctionKind::ValueConstructor => self.value_constructor(context),
            FunctionKind::Initializer => self.initializer(context.owner_or_err()?),
            FunctionKind::Destructor => self.destructor(context.owner_or_err()?),
            FunctionKind::Callback => self.callback_default(context),
        }
    }

    /// `TR::Name`
    fn engine_class(&self, class: &str) -> String {
        format!("{}::{class}", self.engine_namespace)
    }

    /// Expression for the receiver's backing pointer (`void *`)
    fn receiver_impl(&self) -> &'static str {
        match self.dialect {
            Dialect::Flat => "self->_impl",
            Dialect::ObjectOriented => "_impl",
        }
    }

    /// Ordinary method or free function: prepare, call, recover, return
    fn forwarding(&self, context: &FunctionContext<'_>) -> GenerationResult<Body> {
        let function = context.function;
        let mut body = Body::default();
        let args = self.marshal_parameters(context, &mut body)?;

        let target = match context.owner {
            None => format!("{}{}", self.free_function_prefix, function.name),
            Some(owner) if function.modifiers.is_static => format!("{}::{}", self.engine_class(&owner.name), function.name),
            Some(owner) => format!(
                "static_cast<{} *>({})->{}",
                self.engine_class(&owner.name),
                self.receiver_impl(),
                function.name
            ),
        };
        let call = format!("{target}({})", args.join(", "));

        let invoke = body.block_mut(Phase::Invoke);
        if function.return_type.is_void() {
            invoke.line(format!("{call};"));
        } else {
            let engine_return = self.catalog.engine_type(&function.return_type)?;
            invoke.line(format!("{engine_return} {RESULT} = {call};"));
        }

        self.translate_return(context, &mut body)?;
        Ok(body)
    }

    /// Return phase for a forwarded call
    fn translate_return(&self, context: &FunctionContext<'_>, body: &mut Body) -> GenerationResult<()> {
        let function = context.function;
        let ty = &function.return_type;
        if ty.needs_marshalling() {
            return Err(GenerationError::inconsistency(context.location(), format!("cannot return a value of type {ty}")));
        }

        let owns = self.catalog.owns_backing_object(ty)?;
        if function.modifiers.creates_backing_object && !owns {
            return Err(GenerationError::inconsistency(
                context.location(),
                "only object returns can wrap a new backing object",
            ));
        }

        let statement = if ty.is_void() {
            return Ok(());
        } else if function.modifiers.creates_backing_object {
            let class = self.catalog.bare_name(ty)?;
            self.require_creatable(context, class)?;
            match self.dialect {
                Dialect::Flat => format!("return Create{class}(static_cast<void *>({RESULT}));"),
                Dialect::ObjectOriented => format!("return new {class}(static_cast<void *>({RESULT}));"),
            }
        } else if owns {
            format!("return {}({RESULT});", self.client_of(ty)?)
        } else {
            format!("return {RESULT};")
        };
        body.block_mut(Phase::Return).line(statement);
        Ok(())
    }

    fn require_creatable(&self, context: &FunctionContext<'_>, class: &str) -> GenerationResult<()> {
        match self.schema.class(class) {
            Some(target) if target.flags.creatable => Ok(()),
            _ => Err(GenerationError::inconsistency(
                context.location(),
                format!("returned backing object cannot be paired: {class} is not creatable"),
            )),
        }
    }

    /// `JitBind::clientOf<K>` for an object type
    fn client_of(&self, ty: &AbstractType) -> GenerationResult<String> {
        Ok(format!("{SUPPORT_NAMESPACE}::clientOf<{}>", self.catalog.bare_name(ty)?))
    }

    /// Surface value `expr` of type `ty` converted for the engine
    fn engine_value(&self, ty: &AbstractType, expr: &str) -> GenerationResult<String> {
        let cast = self.catalog.boundary_cast(ty)?;
        Ok(if self.catalog.owns_backing_object(ty)? {
            format!("{cast}({SUPPORT_NAMESPACE}::implOf({expr}))")
        } else if cast.is_empty() {
            expr.to_string()
        } else {
            format!("{cast}({expr})")
        })
    }

    /// Engine value `expr` of type `ty` converted for the surface
    fn surface_value(&self, ty: &AbstractType, expr: &str) -> GenerationResult<String> {
        Ok(if self.catalog.owns_backing_object(ty)? {
            format!("{}({expr})", self.client_of(ty)?)
        } else {
            expr.to_string()
        })
    }
}

/// Pointer-to-`ty` spelling, `TR::K *` becoming `TR::K **`
pub(crate) fn pointer_to(ty: &str) -> String {
    if ty.ends_with('*') { format!("{ty}*") } else { format!("{ty} *") }
}
