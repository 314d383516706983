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

//! Structural checks run when a schema is built
//!
//! These rules only cover what the schema can decide on its own. Questions
//! that need type representations (unknown classes used as parameter types,
//! missing count parameters) are answered at generation time.
//!
//! Classes are emitted in schema order, which is expected to list every
//! superclass before its subclasses; that order is not enforced here.

use crate::class::Class;
use crate::error::{SchemaError, SchemaResult};
use crate::function::{Function, FunctionKind, MAX_PARAMETERS};
use crate::schema::Schema;
use std::collections::{HashMap, HashSet};

/// Index classes by name, rejecting duplicates
pub fn index_classes(classes: &[Class]) -> SchemaResult<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(classes.len());
    for (position, class) in classes.iter().enumerate() {
        if index.insert(class.name.clone(), position).is_some() {
            return Err(SchemaError::DuplicateClass(class.name.clone()));
        }
    }
    Ok(index)
}

/// Validate an indexed schema
pub fn validate_schema(schema: &Schema) -> SchemaResult<()> {
    for class in schema.classes() {
        check_superclass(schema, class)?;
    }
    for class in schema.classes() {
        check_acyclic(schema, class)?;
        check_class(class)?;
    }
    for class in schema.classes() {
        check_surface(schema, class)?;
    }
    check_free_functions(schema.functions())
}

fn check_superclass(schema: &Schema, class: &Class) -> SchemaResult<()> {
    match &class.superclass {
        Some(superclass) if schema.class(superclass).is_none() => Err(SchemaError::UnknownSuperclass {
            class: class.name.clone(),
            superclass: superclass.clone(),
        }),
        _ => Ok(()),
    }
}

fn check_acyclic(schema: &Schema, class: &Class) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    seen.insert(class.name.as_str());
    let mut current = class.superclass.as_deref();
    while let Some(name) = current {
        if !seen.insert(name) {
            return Err(SchemaError::InheritanceCycle(class.name.clone()));
        }
        current = schema.class(name).and_then(|c| c.superclass.as_deref());
    }
    Ok(())
}

fn check_class(class: &Class) -> SchemaResult<()> {
    if class.short_name.is_empty() {
        return Err(SchemaError::InvalidClass {
            class: class.name.clone(),
            reason: "short name must not be empty".to_string(),
        });
    }

    let mut names = HashSet::new();
    for function in &class.functions {
        if !names.insert(function.disambiguated_name()) {
            return Err(SchemaError::DuplicateFunction {
                owner: class.name.clone(),
                name: function.disambiguated_name(),
            });
        }
        check_function(&class.name, function)?;
    }

    let creators = class.functions_of_kind(FunctionKind::Creator).count();
    match (class.flags.creatable, creators) {
        (false, 0) | (true, 1) => {}
        (false, _) => {
            return Err(SchemaError::InvalidClass {
                class: class.name.clone(),
                reason: "declares a creator but is not creatable".to_string(),
            });
        }
        (true, 0) => {
            return Err(SchemaError::InvalidClass {
                class: class.name.clone(),
                reason: "is creatable but declares no creator".to_string(),
            });
        }
        (true, _) => {
            return Err(SchemaError::InvalidClass {
                class: class.name.clone(),
                reason: format!("declares {creators} creators"),
            });
        }
    }

    if class.functions_of_kind(FunctionKind::Destructor).count() > 1 {
        return Err(SchemaError::InvalidClass {
            class: class.name.clone(),
            reason: "declares more than one destructor".to_string(),
        });
    }

    let mut fields = HashSet::new();
    for field in &class.fields {
        if !fields.insert(field.name.as_str()) {
            return Err(SchemaError::InvalidClass {
                class: class.name.clone(),
                reason: format!("duplicate field {}", field.name),
            });
        }
    }
    Ok(())
}

/// Every function reaching `class`, own or inherited, surfaces under one name
fn check_surface(schema: &Schema, class: &Class) -> SchemaResult<()> {
    let mut names = HashSet::new();
    for surface in schema.surface_functions(class) {
        let name = surface.function.disambiguated_name();
        if names.contains(&name) {
            return Err(SchemaError::InheritedFunctionClash {
                class: class.name.clone(),
                ancestor: surface.declared_in.name.clone(),
                name,
            });
        }
        names.insert(name);
    }
    Ok(())
}

fn invalid(owner: &str, function: &Function, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidFunction {
        owner: owner.to_string(),
        function: function.name.clone(),
        reason: reason.into(),
    }
}

fn check_function(owner: &str, function: &Function) -> SchemaResult<()> {
    if function.parameters.len() > MAX_PARAMETERS {
        return Err(invalid(
            owner,
            function,
            format!("{} parameters exceed the limit of {MAX_PARAMETERS}", function.parameters.len()),
        ));
    }

    let markers = function.parameters.iter().filter(|p| p.ty.is_varargs()).count();
    if markers > 1 {
        return Err(invalid(owner, function, "more than one variadic marker"));
    }
    if let Some(position) = function.varargs_position() {
        if position == 0 {
            return Err(invalid(owner, function, "variadic marker needs a preceding count parameter"));
        }
        if function.group_parameters().is_empty() {
            return Err(invalid(owner, function, "variadic marker must be followed by a group parameter"));
        }
    }

    match function.kind {
        FunctionKind::Creator | FunctionKind::Initializer if !function.parameters.is_empty() => {
            Err(invalid(owner, function, "takes only the backing object and declares no parameters"))
        }
        FunctionKind::Destructor if !function.parameters.is_empty() => Err(invalid(owner, function, "destructor takes no parameters")),
        _ => Ok(()),
    }
}

fn check_free_functions(functions: &[Function]) -> SchemaResult<()> {
    let mut names = HashSet::new();
    for function in functions {
        if function.kind != FunctionKind::Ordinary {
            return Err(invalid("<free>", function, "free functions must be ordinary"));
        }
        if !names.insert(function.disambiguated_name()) {
            return Err(SchemaError::DuplicateFunction {
                owner: "<free>".to_string(),
                name: function.disambiguated_name(),
            });
        }
        check_function("<free>", function)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::class::{Class, Field};
    use crate::error::SchemaError;
    use crate::function::{Function, FunctionKind};
    use crate::schema::Schema;
    use crate::types::AbstractType;

    #[test]
    fn test_rejects_duplicate_class() {
        let result = Schema::builder().class(Class::new("IlType", "IT")).class(Class::new("IlType", "IT")).build();
        assert_eq!(result.unwrap_err(), SchemaError::DuplicateClass("IlType".to_string()));
    }

    #[test]
    fn test_rejects_unknown_superclass() {
        let result = Schema::builder().class(Class::new("MethodBuilder", "MB").extends("IlBuilder")).build();
        assert!(matches!(result, Err(SchemaError::UnknownSuperclass { .. })));
    }

    #[test]
    fn test_rejects_cycle() {
        let result = Schema::builder()
            .class(Class::new("A", "A").extends("B"))
            .class(Class::new("B", "B").extends("A"))
            .build();
        assert!(matches!(result, Err(SchemaError::InheritanceCycle(_))));
    }

    #[test]
    fn test_overload_suffix_disambiguates() {
        let class = Class::new("IlBuilder", "IB")
            .function(Function::new("Call", AbstractType::object("IlBuilder")).param("name", AbstractType::ConstString))
            .function(Function::new("Call", AbstractType::object("IlBuilder")).with_suffix("_array"));
        assert!(Schema::builder().class(class.clone()).build().is_ok());

        let clash = class.function(Function::new("Call", AbstractType::None));
        assert!(matches!(Schema::builder().class(clash).build(), Err(SchemaError::DuplicateFunction { .. })));
    }

    #[test]
    fn test_redeclared_base_function_must_be_overridden() {
        let base = |ret: Function| Class::new("IlBuilder", "IB").function(ret);
        let derived = Class::new("MethodBuilder", "MB").extends("IlBuilder").function(Function::new("Return", AbstractType::None));

        let clash = Schema::builder().class(base(Function::new("Return", AbstractType::None))).class(derived.clone()).build();
        assert!(matches!(
            clash,
            Err(SchemaError::InheritedFunctionClash { ref class, ref ancestor, .. }) if class == "MethodBuilder" && ancestor == "IlBuilder"
        ));

        let overridden = Schema::builder()
            .class(base(Function::new("Return", AbstractType::None).overridden()))
            .class(derived)
            .build();
        assert!(overridden.is_ok());
    }

    #[test]
    fn test_creator_requires_creatable() {
        let class = Class::new("IlBuilder", "IB").function(Function::special(FunctionKind::Creator));
        assert!(matches!(Schema::builder().class(class.clone()).build(), Err(SchemaError::InvalidClass { .. })));
        assert!(Schema::builder().class(class.creatable()).build().is_ok());
        assert!(Schema::builder().class(Class::new("IlBuilder", "IB").creatable()).build().is_err());
    }

    #[test]
    fn test_varargs_placement() {
        let first = Function::new("F", AbstractType::None).param("", AbstractType::Varargs).param("v", AbstractType::Int32);
        let last = Function::new("G", AbstractType::None).param("n", AbstractType::Int32).param("", AbstractType::Varargs);
        let twice = Function::new("H", AbstractType::None)
            .param("n", AbstractType::Int32)
            .param("", AbstractType::Varargs)
            .param("m", AbstractType::Int32)
            .param("", AbstractType::Varargs)
            .param("v", AbstractType::Int32);

        for function in [first, last, twice] {
            let result = Schema::builder().function(function).build();
            assert!(matches!(result, Err(SchemaError::InvalidFunction { .. })));
        }
    }

    #[test]
    fn test_parameter_capacity() {
        let mut function = Function::new("Wide", AbstractType::None);
        for i in 0..17 {
            function = function.param(format!("p{i}"), AbstractType::Int32);
        }
        assert!(Schema::builder().function(function).build().is_err());
    }

    #[test]
    fn test_duplicate_field() {
        let class = Class::new("TypeDictionary", "TD")
            .field(Field::new("Int32", AbstractType::object("IlType")))
            .field(Field::new("Int32", AbstractType::object("IlType")));
        assert!(Schema::builder().class(class).build().is_err());
    }
}
