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

//! Functions and parameters

use crate::types::AbstractType;
use serde::{Deserialize, Serialize};

/// Maximum number of parameters a function may declare
pub const MAX_PARAMETERS: usize = 16;

/// Reserved function names that select a special [`FunctionKind`]
pub mod sentinel {
    pub const CONSTRUCTOR: &str = "@constructor";
    pub const CREATOR: &str = "@creator";
    pub const VALUE_CONSTRUCTOR: &str = "@value_constructor";
    pub const INITIALIZER: &str = "@initializer";
    pub const DESTRUCTOR: &str = "@destructor";
}

/// Member visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
}

/// What a function does at the wrapper/engine boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Forwards to the engine method of the same name
    Ordinary,
    /// Builds a fresh backing object from its arguments
    Constructor,
    /// Adopts a backing object created by the engine
    Creator,
    /// Static factory building a fresh backing object for a value type
    ValueConstructor,
    /// Links an existing wrapper to a backing object
    Initializer,
    /// Releases the backing object
    Destructor,
    /// Implemented by user code, invoked by the engine
    Callback,
}

impl FunctionKind {
    /// Classify a function by its name and callback flag
    pub fn classify(name: &str, is_callback: bool) -> Self {
        if is_callback {
            return Self::Callback;
        }
        match name {
            sentinel::CONSTRUCTOR => Self::Constructor,
            sentinel::CREATOR => Self::Creator,
            sentinel::VALUE_CONSTRUCTOR => Self::ValueConstructor,
            sentinel::INITIALIZER => Self::Initializer,
            sentinel::DESTRUCTOR => Self::Destructor,
            _ => Self::Ordinary,
        }
    }

    /// Reserved name for special kinds
    pub fn sentinel(self) -> Option<&'static str> {
        match self {
            Self::Constructor => Some(sentinel::CONSTRUCTOR),
            Self::Creator => Some(sentinel::CREATOR),
            Self::ValueConstructor => Some(sentinel::VALUE_CONSTRUCTOR),
            Self::Initializer => Some(sentinel::INITIALIZER),
            Self::Destructor => Some(sentinel::DESTRUCTOR),
            Self::Ordinary | Self::Callback => None,
        }
    }

    /// Anything other than an ordinary forwarding method
    pub fn is_special(self) -> bool {
        !matches!(self, Self::Ordinary)
    }

    /// Kinds whose body establishes the wrapper/backing pairing
    pub fn links_identity(self) -> bool {
        matches!(self, Self::Constructor | Self::Creator | Self::ValueConstructor | Self::Initializer)
    }

    /// Kinds that construct a new backing object
    pub fn builds_backing_object(self) -> bool {
        matches!(self, Self::Constructor | Self::ValueConstructor)
    }
}

/// Modifiers orthogonal to the function kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FunctionModifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    /// A subclass redeclares this function, so it is not inherited
    pub overridden_in_subclass: bool,
    /// The returned object is freshly created by the engine and has no wrapper yet
    pub creates_backing_object: bool,
}

/// A named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbstractType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: AbstractType) -> Self {
        Self { name: name.into(), ty }
    }

    /// Recomputed from the type on every call
    pub fn passed_by_reference(&self) -> bool {
        self.ty.is_passed_by_reference()
    }
}

/// A function of a class, or a free function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub doc: String,
    pub name: String,
    /// Appended to the surface name where the dialect cannot overload
    pub overload_suffix: String,
    pub return_type: AbstractType,
    pub kind: FunctionKind,
    pub visibility: Visibility,
    pub modifiers: FunctionModifiers,
    pub parameters: Vec<Parameter>,
}

impl Function {
    /// Create a function; its kind follows from the name
    pub fn new(name: impl Into<String>, return_type: AbstractType) -> Self {
        let name = name.into();
        Self {
            kind: FunctionKind::classify(&name, false),
            doc: String::new(),
            name,
            overload_suffix: String::new(),
            return_type,
            visibility: Visibility::Public,
            modifiers: FunctionModifiers::default(),
            parameters: Vec::new(),
        }
    }

    /// Create a special function from its kind
    pub fn special(kind: FunctionKind) -> Self {
        let name = kind.sentinel().unwrap_or_default();
        let mut function = Self::new(name, AbstractType::None);
        function.kind = kind;
        function
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.overload_suffix = suffix.into();
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: AbstractType) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    pub fn virtual_method(mut self) -> Self {
        self.modifiers.is_virtual = true;
        self
    }

    pub fn overridden(mut self) -> Self {
        self.modifiers.overridden_in_subclass = true;
        self
    }

    pub fn creates_backing_object(mut self) -> Self {
        self.modifiers.creates_backing_object = true;
        self
    }

    pub fn callback(mut self) -> Self {
        self.kind = FunctionKind::Callback;
        self
    }

    /// Index of the variadic marker, if present
    pub fn varargs_position(&self) -> Option<usize> {
        self.parameters.iter().position(|p| p.ty.is_varargs())
    }

    pub fn is_variadic(&self) -> bool {
        self.varargs_position().is_some()
    }

    /// Parameters before the variadic marker (all parameters when there is none)
    pub fn fixed_parameters(&self) -> &[Parameter] {
        match self.varargs_position() {
            Some(index) => &self.parameters[..index],
            None => &self.parameters,
        }
    }

    /// Repeated-group parameters following the variadic marker
    pub fn group_parameters(&self) -> &[Parameter] {
        match self.varargs_position() {
            Some(index) => &self.parameters[index + 1..],
            None => &[],
        }
    }

    /// Surfaced again on every subclass by the inherited pass
    pub fn is_inheritable(&self) -> bool {
        self.kind == FunctionKind::Ordinary && !self.modifiers.overridden_in_subclass
    }

    /// Name plus overload suffix
    pub fn disambiguated_name(&self) -> String {
        format!("{}{}", self.name, self.overload_suffix)
    }
}
