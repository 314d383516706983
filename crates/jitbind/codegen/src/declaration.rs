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

//! Declaration synthesis
//!
//! Builds the surface signature of a function for one dialect: return type,
//! surface name, receiver and parameter list.
//!
//! | kind | flat | object-oriented |
//! |---|---|---|
//! | ordinary | `<short>_<name><suffix>(self, ...)` | `<name>(...)` |
//! | constructor | `New<Class><suffix>(...)` | `<Class>(...)` |
//! | creator | `Create<Class>(void * impl)` | `<Class>(void * impl)` |
//! | value constructor | `Make<Class><suffix>(...)` | `static <Class> * Make<suffix>(...)` |
//! | initializer | `Initialize<Class>(self, void * impl)` | `initializeFromImpl(void * impl)` |
//! | destructor | `Delete<Class>(self)` | `~<Class>()` |
//! | callback | function pointer typedef | `virtual <name>(...)` |

use crate::catalog::TypeCatalog;
use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use jitbind_common::{AbstractType, Class, Function, FunctionKind, Visibility};
use std::collections::HashSet;

/// Receiver name of flat functions
pub const RECEIVER: &str = "self";

/// Parameter carrying an engine object into creators and initializers
pub const IMPL_PARAMETER: &str = "impl";

/// Scope reported for clashes between free functions
pub const FREE_FUNCTION_SCOPE: &str = "<free>";

/// Context parameter of callback trampolines
pub const CLIENT_PARAMETER: &str = "clientObj";

/// A rendered function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub dialect: Dialect,
    /// Absent for object-oriented constructors and destructors
    pub return_type: Option<String>,
    pub name: String,
    /// Rendered `type name` pairs
    pub params: Vec<String>,
    pub variadic: bool,
    /// Description of the repeated group following the ellipsis
    pub group_comment: Option<String>,
    pub is_static: bool,
    pub is_virtual: bool,
    pub visibility: Visibility,
}

fn typed(ty: &str, name: &str) -> String {
    format!("{ty} {name}")
}

impl Declaration {
    fn new(dialect: Dialect, return_type: Option<String>, name: impl Into<String>) -> Self {
        Self {
            dialect,
            return_type,
            name: name.into(),
            params: Vec::new(),
            variadic: false,
            group_comment: None,
            is_static: false,
            is_virtual: false,
            visibility: Visibility::Public,
        }
    }

    pub fn parameter_list(&self) -> String {
        let mut parts = self.params.clone();
        if self.variadic {
            parts.push("...".to_string());
        }
        if parts.is_empty() && self.dialect.is_flat() {
            return "void".to_string();
        }
        parts.join(", ")
    }

    fn signature(&self, name: &str) -> String {
        match &self.return_type {
            Some(ret) => format!("{ret} {name}({})", self.parameter_list()),
            None => format!("{name}({})", self.parameter_list()),
        }
    }

    /// Header prototype, terminated by `;`
    pub fn prototype(&self) -> String {
        let mut text = String::new();
        if self.is_static {
            text.push_str("static ");
        }
        if self.is_virtual {
            text.push_str("virtual ");
        }
        text.push_str(&self.signature(&self.name));
        text.push(';');
        if let Some(comment) = &self.group_comment {
            text.push_str(" // ");
            text.push_str(comment);
        }
        text
    }

    /// Definition header, qualified with `scope` for class members
    pub fn definition(&self, scope: Option<&str>) -> String {
        match scope {
            Some(scope) => self.signature(&format!("{scope}::{}", self.name)),
            None => self.signature(&self.name),
        }
    }

    /// What the linker or the overload resolver tells apart: the name
    /// alone in C, the name with the parameter types in C++
    pub fn overload_signature(&self) -> String {
        if self.dialect.is_flat() {
            return self.name.clone();
        }
        let mut types: Vec<&str> = self.params.iter().map(|p| p.rsplit_once(' ').map_or(p.as_str(), |(ty, _)| ty)).collect();
        if self.variadic {
            types.push("...");
        }
        format!("{}({})", self.name, types.join(", "))
    }

    /// `typedef` of a pointer to a function with this signature
    pub fn pointer_typedef(&self) -> String {
        let ret = self.return_type.as_deref().unwrap_or("void");
        format!("typedef {ret} (*{})({});", self.name, self.parameter_list())
    }
}

/// Builds declarations for one dialect
pub struct DeclarationSynthesizer<'a> {
    catalog: &'a TypeCatalog,
    dialect: Dialect,
}

impl<'a> DeclarationSynthesizer<'a> {
    pub fn new(catalog: &'a TypeCatalog, dialect: Dialect) -> Self {
        Self { catalog, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn surface(&self, ty: &AbstractType) -> GenerationResult<String> {
        self.catalog.surface_type(ty, self.dialect)
    }

    fn surface_return(&self, ty: &AbstractType) -> GenerationResult<Option<String>> {
        Ok(Some(self.surface(ty)?))
    }

    fn object_pointer(&self, class: &Class) -> GenerationResult<String> {
        self.surface(&class.own_type())
    }

    /// Fill in the surface parameter list of `function`
    fn push_parameters(&self, declaration: &mut Declaration, function: &Function) -> GenerationResult<()> {
        for parameter in function.fixed_parameters() {
            declaration.params.push(typed(&self.surface(&parameter.ty)?, &parameter.name));
        }

        if let Some(position) = function.varargs_position() {
            let count = &function.parameters[position - 1].name;
            let group = function
                .group_parameters()
                .iter()
                .map(|p| Ok(typed(&self.surface(&p.ty)?, &p.name)))
                .collect::<GenerationResult<Vec<_>>>()?;
            declaration.variadic = true;
            declaration.group_comment = Some(format!("repeated {count} times: {}", group.join(", ")));
        }
        Ok(())
    }

    /// Surface declaration of `function` on `owner`, or of a free function
    pub fn declare(&self, function: &Function, owner: Option<&Class>) -> GenerationResult<Declaration> {
        let Some(class) = owner else {
            let mut declaration = Declaration::new(self.dialect, self.surface_return(&function.return_type)?, &function.name);
            self.push_parameters(&mut declaration, function)?;
            return Ok(declaration);
        };

        let mut declaration = match function.kind {
            FunctionKind::Ordinary => self.ordinary(function, class)?,
            FunctionKind::Constructor => self.constructor(function, class)?,
            FunctionKind::Creator => self.adopting_constructor(class)?,
            FunctionKind::ValueConstructor => self.value_constructor(function, class)?,
            FunctionKind::Initializer => self.initializer(class)?,
            FunctionKind::Destructor => self.destructor(class)?,
            FunctionKind::Callback => self.callback(function, class)?,
        };
        declaration.visibility = function.visibility;
        Ok(declaration)
    }

    fn ordinary(&self, function: &Function, class: &Class) -> GenerationResult<Declaration> {
        let ret = self.surface_return(&function.return_type)?;
        let mut declaration = match self.dialect {
            Dialect::Flat => {
                let mut declaration = Declaration::new(self.dialect, ret, format!("{}_{}", class.short_name, function.disambiguated_name()));
                if !function.modifiers.is_static {
                    declaration.params.push(typed(&self.object_pointer(class)?, RECEIVER));
                }
                declaration
            }
            Dialect::ObjectOriented => {
                let mut declaration = Declaration::new(self.dialect, ret, &function.name);
                declaration.is_static = function.modifiers.is_static;
                declaration.is_virtual = function.modifiers.is_virtual && !function.modifiers.is_static;
                declaration
            }
        };
        self.push_parameters(&mut declaration, function)?;
        Ok(declaration)
    }

    fn constructor(&self, function: &Function, class: &Class) -> GenerationResult<Declaration> {
        let mut declaration = match self.dialect {
            Dialect::Flat => Declaration::new(
                self.dialect,
                Some(self.object_pointer(class)?),
                format!("New{}{}", class.name, function.overload_suffix),
            ),
            Dialect::ObjectOriented => Declaration::new(self.dialect, None, &class.name),
        };
        self.push_parameters(&mut declaration, function)?;
        Ok(declaration)
    }

    fn value_constructor(&self, function: &Function, class: &Class) -> GenerationResult<Declaration> {
        let ret = Some(self.object_pointer(class)?);
        let mut declaration = match self.dialect {
            Dialect::Flat => Declaration::new(self.dialect, ret, format!("Make{}{}", class.name, function.overload_suffix)),
            Dialect::ObjectOriented => {
                let mut declaration = Declaration::new(self.dialect, ret, format!("Make{}", function.overload_suffix));
                declaration.is_static = true;
                declaration
            }
        };
        self.push_parameters(&mut declaration, function)?;
        Ok(declaration)
    }

    /// Constructor adopting an engine-created backing object
    pub fn adopting_constructor(&self, class: &Class) -> GenerationResult<Declaration> {
        let mut declaration = match self.dialect {
            Dialect::Flat => Declaration::new(self.dialect, Some(self.object_pointer(class)?), format!("Create{}", class.name)),
            Dialect::ObjectOriented => Declaration::new(self.dialect, None, &class.name),
        };
        declaration.params.push(typed("void *", IMPL_PARAMETER));
        Ok(declaration)
    }

    /// Links an existing wrapper to a backing object
    pub fn initializer(&self, class: &Class) -> GenerationResult<Declaration> {
        let mut declaration = match self.dialect {
            Dialect::Flat => {
                let mut declaration = Declaration::new(self.dialect, Some("void".to_string()), format!("Initialize{}", class.name));
                declaration.params.push(typed(&self.object_pointer(class)?, RECEIVER));
                declaration
            }
            Dialect::ObjectOriented => Declaration::new(self.dialect, Some("void".to_string()), "initializeFromImpl"),
        };
        declaration.params.push(typed("void *", IMPL_PARAMETER));
        Ok(declaration)
    }

    pub fn destructor(&self, class: &Class) -> GenerationResult<Declaration> {
        match self.dialect {
            Dialect::Flat => {
                let mut declaration = Declaration::new(self.dialect, Some("void".to_string()), format!("Delete{}", class.name));
                declaration.params.push(typed(&self.object_pointer(class)?, RECEIVER));
                Ok(declaration)
            }
            Dialect::ObjectOriented => {
                let mut declaration = Declaration::new(self.dialect, None, format!("~{}", class.name));
                declaration.is_virtual = true;
                Ok(declaration)
            }
        }
    }

    /// The user-facing side of a callback: a virtual method, or a function
    /// pointer type for the flat slot
    pub fn callback(&self, function: &Function, class: &Class) -> GenerationResult<Declaration> {
        if function.parameters.iter().any(|p| p.ty.needs_marshalling()) {
            return Err(GenerationError::inconsistency(
                format!("{}::{}", class.name, function.name),
                "callback parameters cannot be marshalled",
            ));
        }

        let ret = self.surface_return(&function.return_type)?;
        let mut declaration = match self.dialect {
            Dialect::Flat => {
                let mut declaration = Declaration::new(self.dialect, ret, callback_type_name(class, function));
                declaration.params.push(typed(&self.object_pointer(class)?, RECEIVER));
                declaration
            }
            Dialect::ObjectOriented => {
                let mut declaration = Declaration::new(self.dialect, ret, &function.name);
                declaration.is_virtual = true;
                declaration
            }
        };
        self.push_parameters(&mut declaration, function)?;
        declaration.visibility = function.visibility;
        Ok(declaration)
    }

    /// File-local function the engine invokes for a callback registered by `class`
    pub fn trampoline(&self, class: &Class, function: &Function) -> GenerationResult<Declaration> {
        let ret = Some(self.catalog.engine_type(&function.return_type)?);
        let mut declaration = Declaration::new(self.dialect, ret, trampoline_name(class, &function.name));
        declaration.params.push(typed("void *", CLIENT_PARAMETER));
        for parameter in &function.parameters {
            declaration.params.push(typed(&self.catalog.engine_type(&parameter.ty)?, &parameter.name));
        }
        Ok(declaration)
    }
}

/// Reject declarations in one scope that the target language cannot tell apart
pub fn check_distinct<'d>(scope: &str, declarations: impl IntoIterator<Item = &'d Declaration>) -> GenerationResult<()> {
    let mut seen = HashSet::new();
    for declaration in declarations {
        let signature = declaration.overload_signature();
        if !seen.insert(signature.clone()) {
            return Err(GenerationError::inconsistency(
                scope,
                format!("{signature} is declared twice in the {} dialect", declaration.dialect),
            ));
        }
    }
    Ok(())
}

/// Flat function pointer type stored in a callback slot
pub fn callback_type_name(class: &Class, function: &Function) -> String {
    format!("{}_{}_Callback", class.name, function.name)
}

pub fn trampoline_name(class: &Class, callback: &str) -> String {
    format!("{}Callback_{callback}", class.name)
}
