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

//! End-to-end binding generation tests

use jitbind_codegen::body::find_count_parameter;
use jitbind_codegen::{BindingGenerator, Dialect, GeneratorConfig, LayoutFlattener};
use jitbind_common::{AbstractType, ApiDescription, Class, Field, Function, FunctionKind, Schema};

fn jit_builder_schema() -> Schema {
    Schema::builder()
        .class(Class::new("IlType", "IT"))
        .class(Class::new("IlValue", "IV"))
        .class(Class::new("TypeDictionary", "TD").function(Function::special(FunctionKind::Constructor)))
        .class(
            Class::new("IlBuilder", "IB")
                .creatable()
                .field(Field::new("NoType", AbstractType::object("IlType")).assigned_at_construction())
                .function(Function::special(FunctionKind::Creator))
                .function(
                    Function::new("IfThen", AbstractType::None)
                        .param("thenPath", AbstractType::object_ref("IlBuilder"))
                        .param("condition", AbstractType::object("IlValue")),
                )
                .function(
                    Function::new("Switch", AbstractType::None)
                        .param("selectionVar", AbstractType::ConstString)
                        .param("defaultBuilder", AbstractType::object_ref("IlBuilder"))
                        .param("numCases", AbstractType::Int32)
                        .param("caseValues", AbstractType::Int32Array)
                        .param("caseBuilders", AbstractType::object_ref_array("IlBuilder")),
                )
                .function(
                    Function::new("Call", AbstractType::object("IlValue"))
                        .with_suffix("_varargs")
                        .param("name", AbstractType::ConstString)
                        .param("numArgs", AbstractType::Int32)
                        .param("", AbstractType::Varargs)
                        .param("arg", AbstractType::object("IlValue"))
                        .param("builder", AbstractType::object_ref("IlBuilder")),
                )
                .function(Function::new("buildIL", AbstractType::Boolean).callback()),
        )
        .class(
            Class::new("MethodBuilder", "MB")
                .extends("IlBuilder")
                .creatable()
                .field(Field::new("Name", AbstractType::ConstString))
                .function(Function::special(FunctionKind::Constructor).param("types", AbstractType::object("TypeDictionary")))
                .function(Function::special(FunctionKind::Creator))
                .function(Function::new("RequestFunction", AbstractType::Boolean).callback().param("name", AbstractType::ConstString)),
        )
        .function(Function::new("initializeJit", AbstractType::Boolean))
        .build()
        .unwrap()
}

fn position(text: &str, needle: &str) -> usize {
    text.find(needle).unwrap_or_else(|| panic!("missing `{needle}` in\n{text}"))
}

/// Text of the definition that starts with `header`
fn definition<'a>(text: &'a str, header: &str) -> &'a str {
    let start = position(text, header);
    let end = text[start..].find("\n}\n").map(|e| start + e + 3).unwrap_or(text.len());
    &text[start..end]
}

#[test]
fn test_two_level_hierarchy() {
    let schema = jit_builder_schema();
    let flattener = LayoutFlattener::new(&schema);
    let base = flattener.flatten(schema.class("IlBuilder").unwrap()).unwrap();
    let derived = flattener.flatten(schema.class("MethodBuilder").unwrap()).unwrap();
    assert!(base.is_prefix_of(&derived));

    let generated = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();
    let flat = generated.output(Dialect::Flat).unwrap();
    let body = &flat.class("MethodBuilder").unwrap().body.contents;

    // the inherited by-reference call prepares, calls, then recovers
    let if_then = definition(body, "void MB_IfThen(MethodBuilder * self, IlBuilder ** thenPath, IlValue * condition)");
    let prepare = position(if_then, "TR::IlBuilder * thenPathImpl = ");
    let call = position(if_then, "->IfThen(thenPathArg, ");
    let recover = position(if_then, "if (thenPath != NULL && thenPathImpl != thenPathOrig)");
    assert!(prepare < call && call < recover);

    for output in &generated.outputs {
        let aggregate = &output.aggregate_header.contents;
        let header = format!("#include \"IlBuilder.{}\"", output.dialect.header_extension());
        let derived = format!("#include \"MethodBuilder.{}\"", output.dialect.header_extension());
        assert!(position(aggregate, &header) < position(aggregate, &derived));
    }
}

#[test]
fn test_flat_creator_order() {
    let schema = jit_builder_schema();
    let generated = BindingGenerator::new(GeneratorConfig::for_dialect(Dialect::Flat))
        .unwrap()
        .generate(&schema)
        .unwrap();
    let body = &generated.outputs[0].class("MethodBuilder").unwrap().body.contents;
    let creator = definition(body, "MethodBuilder * CreateMethodBuilder(void * impl)");

    let steps = [
        "calloc(1, sizeof(MethodBuilder))",
        "obj->NoType = JitBind::clientOf<IlType>(implObj->NoType);",
        "obj->_impl = static_cast<void *>(implObj);",
        "JitBind::pairWith(implObj, obj);",
        "implObj->setClientCallback_buildIL(reinterpret_cast<void *>(&MethodBuilderCallback_buildIL));",
        "implObj->setClientCallback_RequestFunction(reinterpret_cast<void *>(&MethodBuilderCallback_RequestFunction));",
        "return obj;",
    ];
    let positions: Vec<_> = steps.iter().map(|step| position(creator, step)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "creator steps out of order:\n{creator}");
}

#[test]
fn test_array_count_scan() {
    let schema = jit_builder_schema();
    let switch = schema.class("IlBuilder").unwrap().functions.iter().find(|f| f.name == "Switch").unwrap();
    // caseBuilders scans left over caseValues to numCases
    assert_eq!(find_count_parameter(&switch.parameters, 4), Some(2));

    let generated = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();
    for output in &generated.outputs {
        let body = &output.class("IlBuilder").unwrap().body.contents;
        assert!(body.contains("caseBuildersArg = new TR::IlBuilder *[numCases];"));
        assert!(body.contains("for (int32_t i = 0; i < numCases; i++)"));
        assert!(body.contains("delete[] caseBuildersArg;"));
    }
}

#[test]
fn test_variadic_arrays_are_released() {
    let schema = jit_builder_schema();
    let generated = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();

    for output in &generated.outputs {
        let body = &output.class("IlBuilder").unwrap().body.contents;
        let header = match output.dialect {
            Dialect::Flat => "IlValue * IB_Call_varargs(IlBuilder * self, const char * name, int32_t numArgs, ...)",
            Dialect::ObjectOriented => "IlValue * IlBuilder::Call(const char * name, int32_t numArgs, ...)",
        };
        let call = definition(body, header);

        let allocations = call.matches("new ").count();
        let releases = call.matches("delete[] ").count();
        assert_eq!(allocations, 3, "argArg, builderRefs and builderArg:\n{call}");
        assert_eq!(allocations, releases);
        assert!(position(call, "va_start(vararg, numArgs);") < position(call, "va_end(vararg);"));
        assert!(call.contains("for (int32_t i = 0; i < numArgs; i++) {"));
        let last_release = call.rfind("delete[] ").unwrap();
        assert!(last_release < position(call, "return JitBind::clientOf<IlValue>(implRet);"));
    }
}

#[test]
fn test_object_oriented_ownership_chain() {
    let schema = jit_builder_schema();
    let generated = BindingGenerator::new(GeneratorConfig::for_dialect(Dialect::ObjectOriented))
        .unwrap()
        .generate(&schema)
        .unwrap();
    let output = &generated.outputs[0];

    let header = &output.class("MethodBuilder").unwrap().header.contents;
    assert!(header.contains("class MethodBuilder : public IlBuilder {"));
    let body = &output.class("MethodBuilder").unwrap().body.contents;
    assert!(body.contains(": IlBuilder(static_cast<void *>(new TR::MethodBuilder("));
    // one backing object, built once
    assert_eq!(body.matches("new TR::MethodBuilder(").count(), 1);
}

#[test]
fn test_description_to_bindings() {
    let description = ApiDescription::from_json(
        r#"{
            "classes": [
                { "name": "IlValue", "shortName": "IV" },
                {
                    "name": "IlBuilder",
                    "shortName": "IB",
                    "flags": ["creatable"],
                    "functions": [
                        { "name": "@creator" },
                        {
                            "name": "Add",
                            "return": "IlValue",
                            "parameters": [
                                { "name": "left", "type": "IlValue" },
                                { "name": "right", "type": "IlValue" }
                            ]
                        }
                    ]
                }
            ],
            "functions": [ { "name": "shutdownJit" } ]
        }"#,
    )
    .unwrap();
    let schema = description.into_schema().unwrap();
    let generated = BindingGenerator::new(GeneratorConfig::default()).unwrap().generate(&schema).unwrap();

    let flat = generated.output(Dialect::Flat).unwrap();
    assert!(flat.class("IlBuilder").unwrap().header.contents.contains("IlValue * IB_Add(IlBuilder * self, IlValue * left, IlValue * right);"));
    assert!(flat.aggregate_header.contents.contains("void shutdownJit(void);"));
    assert_eq!(generated.stats.class_count, 2);
}
