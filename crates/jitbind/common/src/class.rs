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

//! Classes and fields

use crate::function::{Function, FunctionKind, Visibility};
use crate::types::AbstractType;

/// A data member of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: AbstractType,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Resolved from the backing object when the wrapper is linked
    pub assign_at_construction: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: AbstractType) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_static: false,
            assign_at_construction: false,
        }
    }

    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn assigned_at_construction(mut self) -> Self {
        self.assign_at_construction = true;
        self
    }
}

/// Class-level flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassFlags {
    /// Engine-created backing objects of this class may be adopted by a new wrapper
    pub creatable: bool,
    /// Headers include hand-written extra declarations
    pub has_extra_declarations: bool,
}

/// An engine-backed class
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub doc: String,
    pub name: String,
    /// Prefix for flat free-function names
    pub short_name: String,
    pub flags: ClassFlags,
    pub superclass: Option<String>,
    pub fields: Vec<Field>,
    pub functions: Vec<Function>,
}

impl Class {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            doc: String::new(),
            name: name.into(),
            short_name: short_name.into(),
            flags: ClassFlags::default(),
            superclass: None,
            fields: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn creatable(mut self) -> Self {
        self.flags.creatable = true;
        self
    }

    pub fn with_extra_declarations(mut self) -> Self {
        self.flags.has_extra_declarations = true;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    /// The type tag identifying this class
    pub fn own_type(&self) -> AbstractType {
        AbstractType::object(self.name.clone())
    }

    /// First function of the given kind
    pub fn find_kind(&self, kind: FunctionKind) -> Option<&Function> {
        self.functions.iter().find(|f| f.kind == kind)
    }

    pub fn functions_of_kind(&self, kind: FunctionKind) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(move |f| f.kind == kind)
    }

    pub fn callbacks(&self) -> impl Iterator<Item = &Function> {
        self.functions_of_kind(FunctionKind::Callback)
    }

    /// Fields stored per object (non-static)
    pub fn instance_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_static)
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_static)
    }

    pub fn creator(&self) -> Option<&Function> {
        self.find_kind(FunctionKind::Creator)
    }

    pub fn destructor(&self) -> Option<&Function> {
        self.find_kind(FunctionKind::Destructor)
    }
}
