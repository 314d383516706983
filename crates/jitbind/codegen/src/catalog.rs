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

//! Type catalog
//!
//! Maps every [`AbstractType`] to the representation facts the emitters need.
//! The catalog knows the classes of one schema; a type naming any other class
//! is a [`GenerationError::CatalogMiss`], never a silent fallback.

use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use jitbind_common::{AbstractType, Schema};
use std::collections::HashSet;

/// Representation facts for the types of one schema
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    classes: HashSet<String>,
    engine_namespace: String,
}

fn miss(ty: &AbstractType, fact: &'static str) -> GenerationError {
    GenerationError::CatalogMiss { ty: ty.clone(), fact }
}

impl TypeCatalog {
    pub fn new(schema: &Schema, engine_namespace: impl Into<String>) -> Self {
        Self {
            classes: schema.classes().iter().map(|c| c.name.clone()).collect(),
            engine_namespace: engine_namespace.into(),
        }
    }

    /// Whether `class` is backed by an engine object
    pub fn knows(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Known class name of an object kind, or the miss for `fact`
    fn class_of<'a>(&self, ty: &'a AbstractType, fact: &'static str) -> GenerationResult<Option<&'a str>> {
        match ty.class_name() {
            Some(name) if self.knows(name) => Ok(Some(name)),
            Some(_) => Err(miss(ty, fact)),
            None => Ok(None),
        }
    }

    fn primitive_spelling(ty: &AbstractType, dialect: Dialect) -> Option<&'static str> {
        let spelling = match ty {
            AbstractType::None => "void",
            AbstractType::Boolean if dialect.is_flat() => "int32_t",
            AbstractType::Boolean => "bool",
            AbstractType::Int8 => "int8_t",
            AbstractType::Int16 => "int16_t",
            AbstractType::Int32 => "int32_t",
            AbstractType::Int64 => "int64_t",
            AbstractType::Float => "float",
            AbstractType::Double => "double",
            AbstractType::Pointer => "void *",
            AbstractType::PPointer => "void **",
            AbstractType::ConstString => "const char *",
            AbstractType::MutableString => "char *",
            AbstractType::Int32Array if dialect.is_flat() => "const int32_t *",
            AbstractType::Int32Array => "int32_t *",
            _ => return None,
        };
        Some(spelling)
    }

    /// Spelling of a type in the client-facing surface of `dialect`
    pub fn surface_type(&self, ty: &AbstractType, dialect: Dialect) -> GenerationResult<String> {
        if let Some(spelling) = Self::primitive_spelling(ty, dialect) {
            return Ok(spelling.to_string());
        }
        match (ty, self.class_of(ty, "surface type")?) {
            (AbstractType::Object(_), Some(name)) => Ok(format!("{name} *")),
            (_, Some(name)) => Ok(format!("{name} **")),
            (AbstractType::Varargs, None) => Ok("...".to_string()),
            _ => Err(miss(ty, "surface type")),
        }
    }

    /// Spelling of a type on the engine side of the boundary
    pub fn engine_type(&self, ty: &AbstractType) -> GenerationResult<String> {
        if let Some(spelling) = Self::primitive_spelling(ty, Dialect::ObjectOriented) {
            return Ok(spelling.to_string());
        }
        let ns = &self.engine_namespace;
        match (ty, self.class_of(ty, "engine type")?) {
            (AbstractType::Object(_), Some(name)) => Ok(format!("{ns}::{name} *")),
            (_, Some(name)) => Ok(format!("{ns}::{name} **")),
            _ => Err(miss(ty, "engine type")),
        }
    }

    /// Whether a value of this type is a wrapper paired with a backing object
    pub fn owns_backing_object(&self, ty: &AbstractType) -> GenerationResult<bool> {
        Ok(matches!(ty, AbstractType::Object(_)) && self.class_of(ty, "owns backing object")?.is_some())
    }

    /// Cast applied to a value (or array element) crossing into the engine.
    ///
    /// Empty when the surface value can be passed unchanged.
    pub fn boundary_cast(&self, ty: &AbstractType) -> GenerationResult<String> {
        if let Some(name) = self.class_of(ty, "boundary cast")? {
            return Ok(format!("static_cast<{}::{name} *>", self.engine_namespace));
        }
        match ty {
            AbstractType::Boolean => Ok("static_cast<bool>".to_string()),
            AbstractType::Int32Array => Ok("const_cast<int32_t *>".to_string()),
            _ => Ok(String::new()),
        }
    }

    /// Whether the type is one of the array kinds
    pub fn is_array_kind(&self, ty: &AbstractType) -> GenerationResult<bool> {
        self.class_of(ty, "array kind")?;
        Ok(ty.is_array())
    }

    /// Class name of an engine-backed kind
    pub fn bare_name<'a>(&self, ty: &'a AbstractType) -> GenerationResult<&'a str> {
        self.class_of(ty, "bare name")?.ok_or_else(|| miss(ty, "bare name"))
    }

    /// Type a value of `ty` is read with from a `va_list`, after default promotion
    pub fn vararg_type(&self, ty: &AbstractType, dialect: Dialect) -> GenerationResult<String> {
        match ty {
            AbstractType::Boolean | AbstractType::Int8 | AbstractType::Int16 => Ok("int".to_string()),
            AbstractType::Float => Ok("double".to_string()),
            AbstractType::None | AbstractType::Varargs => Err(miss(ty, "vararg type")),
            _ => self.surface_type(ty, dialect),
        }
    }

    /// Literal returned by an unset or default callback
    pub fn zero_value(&self, ty: &AbstractType) -> GenerationResult<Option<&'static str>> {
        self.class_of(ty, "zero value")?;
        Ok(match ty {
            AbstractType::None => None,
            AbstractType::Varargs => return Err(miss(ty, "zero value")),
            AbstractType::Boolean
            | AbstractType::Int8
            | AbstractType::Int16
            | AbstractType::Int32
            | AbstractType::Int64
            | AbstractType::Float
            | AbstractType::Double => Some("0"),
            _ => Some("NULL"),
        })
    }
}
