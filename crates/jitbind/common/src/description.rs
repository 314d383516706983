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

//! JSON API descriptions
//!
//! An API description is the hand-authored input of the generator. It lists
//! classes and free functions with their types written in the notation of
//! [`AbstractType`](crate::types::AbstractType):
//!
//! ```json
//! {
//!   "classes": [{
//!     "name": "IlBuilder", "shortName": "IB", "flags": ["creatable"],
//!     "functions": [
//!       { "name": "@creator" },
//!       { "name": "Add", "return": "IlValue",
//!         "parameters": [{ "name": "left", "type": "IlValue" }, { "name": "right", "type": "IlValue" }] }
//!     ]
//!   }],
//!   "functions": []
//! }
//! ```

use crate::class::{Class, Field};
use crate::error::{SchemaError, SchemaResult};
use crate::function::{Function, FunctionKind, Parameter};
use crate::schema::Schema;
use crate::types::AbstractType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassFlag {
    Creatable,
    ExtraDeclarations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldFlag {
    Protected,
    Static,
    AssignAtConstruction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionFlag {
    Protected,
    Static,
    Virtual,
    Callback,
    CreatesBackingObject,
    Overridden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbstractType,
    #[serde(default)]
    pub flags: Vec<FieldFlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescription {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub overload_suffix: String,
    #[serde(default, rename = "return")]
    pub return_type: AbstractType,
    #[serde(default)]
    pub flags: Vec<FunctionFlag>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescription {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub flags: Vec<ClassFlag>,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
    #[serde(default)]
    pub functions: Vec<FunctionDescription>,
}

/// A complete API description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescription {
    #[serde(default)]
    pub classes: Vec<ClassDescription>,
    #[serde(default)]
    pub functions: Vec<FunctionDescription>,
}

impl ApiDescription {
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        serde_json::from_str(text).map_err(|e| SchemaError::Description(e.to_string()))
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::Description(e.to_string()))
    }

    /// Assemble and validate the schema this description denotes
    pub fn into_schema(self) -> SchemaResult<Schema> {
        let mut builder = Schema::builder();
        for class in self.classes {
            builder = builder.class(class.into_class());
        }
        for function in self.functions {
            builder = builder.function(function.into_function());
        }
        builder.build()
    }
}

impl FieldDescription {
    fn into_field(self) -> Field {
        let mut field = Field::new(self.name, self.ty);
        for flag in self.flags {
            field = match flag {
                FieldFlag::Protected => field.protected(),
                FieldFlag::Static => field.static_field(),
                FieldFlag::AssignAtConstruction => field.assigned_at_construction(),
            };
        }
        field
    }
}

impl FunctionDescription {
    fn into_function(self) -> Function {
        let is_callback = self.flags.contains(&FunctionFlag::Callback);
        let mut function = Function::new(self.name, self.return_type)
            .with_doc(self.doc)
            .with_suffix(self.overload_suffix);
        function.kind = FunctionKind::classify(&function.name, is_callback);
        function.parameters = self.parameters;

        for flag in self.flags {
            function = match flag {
                FunctionFlag::Protected => function.protected(),
                FunctionFlag::Static => function.static_method(),
                FunctionFlag::Virtual => function.virtual_method(),
                FunctionFlag::CreatesBackingObject => function.creates_backing_object(),
                FunctionFlag::Overridden => function.overridden(),
                FunctionFlag::Callback => function,
            };
        }
        function
    }
}

impl ClassDescription {
    fn into_class(self) -> Class {
        let mut class = Class::new(self.name, self.short_name).with_doc(self.doc);
        class.superclass = self.extends;
        for flag in self.flags {
            class = match flag {
                ClassFlag::Creatable => class.creatable(),
                ClassFlag::ExtraDeclarations => class.with_extra_declarations(),
            };
        }
        class.fields = self.fields.into_iter().map(FieldDescription::into_field).collect();
        class.functions = self.functions.into_iter().map(FunctionDescription::into_function).collect();
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "classes": [
            { "name": "IlValue", "shortName": "IV" },
            {
                "name": "IlBuilder", "shortName": "IB", "flags": ["creatable"],
                "functions": [
                    { "name": "@creator" },
                    { "name": "Add", "return": "IlValue",
                      "parameters": [{ "name": "left", "type": "IlValue" }, { "name": "right", "type": "IlValue" }] },
                    { "name": "buildIL", "return": "boolean", "flags": ["callback"] }
                ]
            },
            {
                "name": "MethodBuilder", "shortName": "MB", "extends": "IlBuilder",
                "fields": [{ "name": "Int32", "type": "IlValue", "flags": ["assignAtConstruction"] }],
                "functions": [{ "name": "@constructor" }]
            }
        ],
        "functions": [{ "name": "initializeJit", "return": "boolean" }]
    }"#;

    #[test]
    fn test_description_into_schema() {
        let schema = ApiDescription::from_json(SAMPLE).unwrap().into_schema().unwrap();
        assert_eq!(schema.classes().len(), 3);
        assert_eq!(schema.functions().len(), 1);

        let builder = schema.class("IlBuilder").unwrap();
        assert!(builder.flags.creatable);
        assert!(builder.creator().is_some());
        assert_eq!(builder.callbacks().count(), 1);
        assert_eq!(builder.functions[1].parameters[0].ty, AbstractType::object("IlValue"));

        let method = schema.class("MethodBuilder").unwrap();
        assert_eq!(method.superclass.as_deref(), Some("IlBuilder"));
        assert!(method.fields[0].assign_at_construction);
        assert_eq!(method.functions[0].kind, FunctionKind::Constructor);
    }

    #[test]
    fn test_description_survives_json_round_trip() {
        let description = ApiDescription::from_json(SAMPLE).unwrap();
        let reparsed = ApiDescription::from_json(&description.to_json().unwrap()).unwrap();
        assert_eq!(description, reparsed);
    }

    #[test]
    fn test_bad_type_notation_is_reported() {
        let text = r#"{ "classes": [{ "name": "A", "shortName": "A",
            "fields": [{ "name": "x", "type": "&" }] }] }"#;
        assert!(matches!(ApiDescription::from_json(text), Err(SchemaError::Description(_))));
    }
}
