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

//! The assembled, read-only schema

use crate::class::Class;
use crate::error::SchemaResult;
use crate::function::Function;
use crate::validate;
use std::collections::HashMap;
use tracing::debug;

/// Every class and free function of an API, validated and indexed
#[derive(Debug, Clone)]
pub struct Schema {
    classes: Vec<Class>,
    index: HashMap<String, usize>,
    functions: Vec<Function>,
}

/// A function as it surfaces on a concrete class
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFunction<'a> {
    pub function: &'a Function,
    /// Class that declares the function
    pub declared_in: &'a Class,
}

impl SurfaceFunction<'_> {
    /// Whether the function reached `class` through the inherited pass
    pub fn is_inherited_by(&self, class: &Class) -> bool {
        self.declared_in.name != class.name
    }
}

/// Iterator over the ancestors of a class, nearest first
pub struct Ancestors<'a> {
    schema: &'a Schema,
    next: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let class = self.schema.class(self.next?)?;
        self.next = class.superclass.as_deref();
        Some(class)
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Classes in declaration order
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Free functions in declaration order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    pub fn superclass_of(&self, class: &Class) -> Option<&Class> {
        class.superclass.as_deref().and_then(|name| self.class(name))
    }

    /// Ancestors of `class`, nearest first
    pub fn ancestors<'a>(&'a self, class: &'a Class) -> Ancestors<'a> {
        Ancestors {
            schema: self,
            next: class.superclass.as_deref(),
        }
    }

    /// `class` and its ancestors, root first
    pub fn lineage<'a>(&'a self, class: &'a Class) -> Vec<&'a Class> {
        let mut chain: Vec<&Class> = self.ancestors(class).collect();
        chain.reverse();
        chain.push(class);
        chain
    }

    /// Whether `class` is `ancestor` or derives from it
    pub fn derives_from(&self, class: &Class, ancestor: &str) -> bool {
        class.name == ancestor || self.ancestors(class).any(|c| c.name == ancestor)
    }

    /// Functions that surface on `class`, in two passes: its own functions,
    /// then the inheritable functions of each ancestor, nearest first.
    pub fn surface_functions<'a>(&'a self, class: &'a Class) -> Vec<SurfaceFunction<'a>> {
        let own = class.functions.iter().map(|function| SurfaceFunction { function, declared_in: class });
        let inherited = self.ancestors(class).flat_map(|ancestor| {
            ancestor
                .functions
                .iter()
                .filter(|f| f.is_inheritable())
                .map(move |function| SurfaceFunction { function, declared_in: ancestor })
        });
        own.chain(inherited).collect()
    }
}

/// Assembles a [`Schema`] once, before generation starts
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    classes: Vec<Class>,
    functions: Vec<Function>,
}

impl SchemaBuilder {
    pub fn class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    /// Validate and index the collected classes and functions
    pub fn build(self) -> SchemaResult<Schema> {
        let index = validate::index_classes(&self.classes)?;
        let schema = Schema {
            classes: self.classes,
            index,
            functions: self.functions,
        };
        validate::validate_schema(&schema)?;

        debug!(classes = schema.classes.len(), functions = schema.functions.len(), "Schema assembled");
        Ok(schema)
    }
}
