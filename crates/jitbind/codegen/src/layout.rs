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

//! Flat struct layout
//!
//! The flat dialect has no inheritance, so a derived struct repeats every
//! member of its superclass, in the same order, before its own. A pointer to
//! the derived struct then reads correctly as a pointer to any ancestor.

use crate::error::{GenerationError, GenerationResult};
use jitbind_common::{AbstractType, Class, Schema};

/// Name of the backing pointer member at offset zero of every flat struct
pub const BACKING_POINTER: &str = "_impl";

/// One member of a flat struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEntry {
    BackingPointer,
    Field { owner: String, name: String, ty: AbstractType },
    /// Opaque function pointer registered for a callback
    CallbackSlot { owner: String, name: String },
}

impl LayoutEntry {
    /// Member name in the struct
    pub fn name(&self) -> &str {
        match self {
            Self::BackingPointer => BACKING_POINTER,
            Self::Field { name, .. } | Self::CallbackSlot { name, .. } => name,
        }
    }

    /// Class that declared the member; the backing pointer has none
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::BackingPointer => None,
            Self::Field { owner, .. } | Self::CallbackSlot { owner, .. } => Some(owner),
        }
    }
}

/// Ordered members of a flat struct
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    entries: Vec<LayoutEntry>,
}

impl Layout {
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this layout is a prefix of `other`
    pub fn is_prefix_of(&self, other: &Layout) -> bool {
        other.entries.starts_with(&self.entries)
    }

    pub fn callback_slots(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter().filter(|e| matches!(e, LayoutEntry::CallbackSlot { .. }))
    }

    fn has_member(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name() == name)
    }

    fn has_slot(&self, name: &str) -> bool {
        self.callback_slots().any(|e| e.name() == name)
    }
}

/// Computes superclass-first layouts
pub struct LayoutFlattener<'a> {
    schema: &'a Schema,
}

impl<'a> LayoutFlattener<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Layout of `class`: its superclass layout, then its own instance
    /// fields, then a slot for each callback without an inherited slot.
    pub fn flatten(&self, class: &Class) -> GenerationResult<Layout> {
        let mut layout = match self.schema.superclass_of(class) {
            Some(superclass) => self.flatten(superclass)?,
            None => Layout {
                entries: vec![LayoutEntry::BackingPointer],
            },
        };

        for field in class.instance_fields() {
            if layout.has_member(&field.name) {
                return Err(GenerationError::inconsistency(
                    format!("{}::{}", class.name, field.name),
                    "field name is already a member of the flattened layout",
                ));
            }
            layout.entries.push(LayoutEntry::Field {
                owner: class.name.clone(),
                name: field.name.clone(),
                ty: field.ty.clone(),
            });
        }

        for callback in class.callbacks() {
            if layout.has_slot(&callback.name) {
                continue;
            }
            if layout.has_member(&callback.name) {
                return Err(GenerationError::inconsistency(
                    format!("{}::{}", class.name, callback.name),
                    "callback slot collides with a field",
                ));
            }
            layout.entries.push(LayoutEntry::CallbackSlot {
                owner: class.name.clone(),
                name: callback.name.clone(),
            });
        }

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitbind_common::{Field, Function};
    use proptest::prelude::*;

    fn names(layout: &Layout) -> Vec<&str> {
        layout.entries().iter().map(LayoutEntry::name).collect()
    }

    #[test]
    fn test_superclass_first() {
        let schema = Schema::builder()
            .class(
                Class::new("IlBuilder", "IB")
                    .field(Field::new("typeDict", AbstractType::Pointer))
                    .field(Field::new("count", AbstractType::Int32).static_field())
                    .function(Function::new("buildIL", AbstractType::Boolean).callback()),
            )
            .class(
                Class::new("MethodBuilder", "MB")
                    .extends("IlBuilder")
                    .field(Field::new("name", AbstractType::ConstString))
                    .function(Function::new("buildIL", AbstractType::Boolean).callback())
                    .function(Function::new("RequestFunction", AbstractType::Boolean).callback()),
            )
            .build()
            .unwrap();

        let flattener = LayoutFlattener::new(&schema);
        let base = flattener.flatten(schema.class("IlBuilder").unwrap()).unwrap();
        let derived = flattener.flatten(schema.class("MethodBuilder").unwrap()).unwrap();

        assert_eq!(names(&base), ["_impl", "typeDict", "buildIL"]);
        // the redeclared callback reuses its inherited slot
        assert_eq!(names(&derived), ["_impl", "typeDict", "buildIL", "name", "RequestFunction"]);
        assert!(base.is_prefix_of(&derived));
        assert!(!derived.is_prefix_of(&base));
    }

    #[test]
    fn test_shadowed_field_is_inconsistent() {
        let schema = Schema::builder()
            .class(Class::new("IlBuilder", "IB").field(Field::new("name", AbstractType::ConstString)))
            .class(Class::new("MethodBuilder", "MB").extends("IlBuilder").field(Field::new("name", AbstractType::ConstString)))
            .build()
            .unwrap();
        let result = LayoutFlattener::new(&schema).flatten(schema.class("MethodBuilder").unwrap());
        assert!(matches!(result, Err(GenerationError::SchemaInconsistency { .. })));
    }

    /// Per level: field count and callback count
    fn hierarchy() -> impl Strategy<Value = Vec<(usize, usize)>> {
        proptest::collection::vec((0usize..4, 0usize..3), 1..6)
    }

    fn build(levels: &[(usize, usize)]) -> Schema {
        let mut builder = Schema::builder();
        for (depth, &(fields, callbacks)) in levels.iter().enumerate() {
            let mut class = Class::new(format!("C{depth}"), format!("C{depth}"));
            if depth > 0 {
                class = class.extends(format!("C{}", depth - 1));
            }
            for f in 0..fields {
                class = class.field(Field::new(format!("f{depth}_{f}"), AbstractType::Int32));
            }
            for c in 0..callbacks {
                // even callbacks share a name across levels and reuse a slot
                let name = if c % 2 == 0 { format!("cb{c}") } else { format!("cb{depth}_{c}") };
                class = class.function(Function::new(name, AbstractType::None).callback());
            }
            builder = builder.class(class);
        }
        builder.build().unwrap()
    }

    proptest! {
        #[test]
        fn superclass_layout_is_prefix(levels in hierarchy()) {
            let schema = build(&levels);
            let flattener = LayoutFlattener::new(&schema);
            for class in schema.classes() {
                let layout = flattener.flatten(class).unwrap();
                prop_assert_eq!(&layout.entries()[0], &LayoutEntry::BackingPointer);
                if let Some(superclass) = schema.superclass_of(class) {
                    let parent = flattener.flatten(superclass).unwrap();
                    prop_assert!(parent.is_prefix_of(&layout));
                }
            }
        }
    }
}
