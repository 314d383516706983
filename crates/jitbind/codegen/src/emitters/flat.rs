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

//! Flat dialect emitter
//!
//! Every class becomes a C struct laid out superclass first, and every
//! function a prefixed free function taking the struct as `self`. Inherited
//! functions are surfaced again under the subclass prefix, so a caller never
//! needs to cast a pointer up the hierarchy.

use super::{EmitContext, function_types, include_guard, referenced_classes, write_definition};
use crate::artifact::{Artifact, ArtifactKind, ClassArtifacts};
use crate::body::FunctionContext;
use crate::declaration::{FREE_FUNCTION_SCOPE, check_distinct};
use crate::dialect::Dialect;
use crate::emitters::traits::DialectEmitter;
use crate::error::{GenerationError, GenerationResult};
use crate::layout::{Layout, LayoutEntry};
use crate::writer::SourceWriter;
use jitbind_common::{Class, FunctionKind, SurfaceFunction};
use std::collections::BTreeSet;

/// Guard around a struct typedef, so any header may introduce it
fn write_typedef(writer: &mut SourceWriter, class: &str) {
    let guard = format!("JITBIND_TYPEDEF_{class}");
    writer.line(format!("#ifndef {guard}"));
    writer.line(format!("#define {guard}"));
    writer.line(format!("typedef struct {class} {class};"));
    writer.line("#endif");
}

fn open_c_linkage(writer: &mut SourceWriter) {
    writer.line("#ifdef __cplusplus");
    writer.line("extern \"C\" {");
    writer.line("#endif");
    writer.blank();
}

fn close_c_linkage(writer: &mut SourceWriter) {
    writer.line("#ifdef __cplusplus");
    writer.line("}");
    writer.line("#endif");
    writer.blank();
}

fn write_body_includes(context: &EmitContext<'_>, writer: &mut SourceWriter, engine: &BTreeSet<String>) {
    writer.line("#include <cstdarg>");
    writer.line("#include <cstdio>");
    writer.line("#include <cstdlib>");
    writer.blank();
    context.write_engine_includes(writer, engine);
    writer.line(format!("#include \"{}\"", context.support_header_name()));
    writer.line(format!("#include \"{}\"", context.aggregate_header_name()));
    writer.blank();
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FlatEmitter;

impl FlatEmitter {
    /// Classes a class header or body mentions
    fn referenced(&self, class: &Class, layout: &Layout, surface: &[SurfaceFunction<'_>]) -> BTreeSet<String> {
        let fields = layout.entries().iter().filter_map(|entry| match entry {
            LayoutEntry::Field { ty, .. } => Some(ty),
            _ => None,
        });
        let statics = class.static_fields().map(|f| &f.ty);
        let functions = surface.iter().flat_map(|s| function_types(s.function));
        let mut classes = referenced_classes(fields.chain(statics).chain(functions));
        classes.insert(class.name.clone());
        classes
    }

    fn header(
        &self,
        context: &EmitContext<'_>,
        class: &Class,
        layout: &Layout,
        surface: &[SurfaceFunction<'_>],
        referenced: &BTreeSet<String>,
    ) -> GenerationResult<Artifact> {
        let guard = include_guard(&[&class.name, "h"]);
        let mut writer = context.writer();
        writer.line(format!("#ifndef {guard}"));
        writer.line(format!("#define {guard}"));
        writer.blank();
        writer.line("#include <stdint.h>");
        writer.blank();
        open_c_linkage(&mut writer);

        for name in referenced {
            write_typedef(&mut writer, name);
        }
        writer.blank();

        writer.comment(&class.doc);
        writer.open(format!("struct {}", class.name));
        for entry in layout.entries() {
            match entry {
                LayoutEntry::Field { ty, name, .. } => {
                    writer.line(format!("{} {name};", context.catalog.surface_type(ty, Dialect::Flat)?));
                }
                _ => writer.line(format!("void * {};", entry.name())),
            }
        }
        writer.close(";");
        writer.blank();

        for field in class.static_fields() {
            let ty = context.catalog.surface_type(&field.ty, Dialect::Flat)?;
            writer.line(format!("extern {ty} {}_{};", class.name, field.name));
        }

        for callback in class.callbacks() {
            writer.line(context.declarations.callback(callback, class)?.pointer_typedef());
        }
        writer.blank();

        for surface in surface.iter().filter(|s| s.function.kind != FunctionKind::Callback) {
            writer.comment(&surface.function.doc);
            writer.line(context.declarations.declare(surface.function, Some(class))?.prototype());
        }
        writer.blank();

        if class.flags.has_extra_declarations {
            writer.line(format!("#include \"{}Extras.h\"", class.name));
            writer.blank();
        }

        close_c_linkage(&mut writer);
        writer.line(format!("#endif // {guard}"));
        Ok(context.artifact(context.class_header_name(&class.name), ArtifactKind::ClassHeader, Some(class), writer))
    }

    fn body(
        &self,
        context: &EmitContext<'_>,
        class: &Class,
        surface: &[SurfaceFunction<'_>],
        referenced: &BTreeSet<String>,
    ) -> GenerationResult<(Artifact, usize)> {
        let mut writer = context.writer();
        write_body_includes(context, &mut writer, referenced);
        context.write_trampolines(&mut writer, class)?;

        writer.line("extern \"C\" {");
        writer.blank();

        for field in class.static_fields() {
            let ty = context.catalog.surface_type(&field.ty, Dialect::Flat)?;
            let zero = context.catalog.zero_value(&field.ty)?.ok_or_else(|| {
                GenerationError::inconsistency(format!("{}::{}", class.name, field.name), "static field has no value type")
            })?;
            writer.line(format!("{ty} {}_{} = {zero};", class.name, field.name));
            writer.blank();
        }

        let mut count = 0;
        for surface in surface.iter().filter(|s| s.function.kind != FunctionKind::Callback) {
            let declaration = context.declarations.declare(surface.function, Some(class))?;
            let body = context.bodies.synthesize(&FunctionContext::member(*surface, class))?;
            write_definition(&mut writer, &declaration.definition(None), &body);
            count += 1;
        }

        writer.line("} // extern \"C\"");
        let artifact = context.artifact(context.class_body_name(&class.name), ArtifactKind::ClassBody, Some(class), writer);
        Ok((artifact, count))
    }
}

impl DialectEmitter for FlatEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::Flat
    }

    fn emit_class(&self, context: &EmitContext<'_>, class: &Class) -> GenerationResult<ClassArtifacts> {
        let layout = context.layouts.flatten(class)?;
        let surface = context.schema.surface_functions(class);
        let referenced = self.referenced(class, &layout, &surface);

        let header = self.header(context, class, &layout, &surface, &referenced)?;
        let (body, function_count) = self.body(context, class, &surface, &referenced)?;
        Ok(ClassArtifacts {
            class: class.name.clone(),
            header,
            body,
            function_count,
        })
    }

    fn emit_aggregate_header(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact> {
        let guard = include_guard(&[&context.config.aggregate_name, "h"]);
        let mut writer = context.writer();
        writer.line(format!("#ifndef {guard}"));
        writer.line(format!("#define {guard}"));
        writer.blank();
        writer.line("#include <stdint.h>");
        writer.blank();
        for class in context.schema.classes() {
            writer.line(format!("#include \"{}\"", context.class_header_name(&class.name)));
        }
        writer.blank();

        open_c_linkage(&mut writer);
        let mut declared = Vec::with_capacity(context.schema.functions().len());
        for function in context.schema.functions() {
            let declaration = context.declarations.declare(function, None)?;
            writer.comment(&function.doc);
            writer.line(declaration.prototype());
            declared.push(declaration);
        }
        check_distinct(FREE_FUNCTION_SCOPE, &declared)?;
        writer.blank();
        close_c_linkage(&mut writer);
        writer.line(format!("#endif // {guard}"));
        Ok(context.artifact(context.aggregate_header_name(), ArtifactKind::AggregateHeader, None, writer))
    }

    fn emit_aggregate_body(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact> {
        let functions = context.schema.functions();
        let engine = referenced_classes(functions.iter().flat_map(function_types));

        let mut writer = context.writer();
        write_body_includes(context, &mut writer, &engine);
        for function in functions {
            writer.line(context.engine_free_function(function)?);
        }
        writer.blank();

        writer.line("extern \"C\" {");
        writer.blank();
        for function in functions {
            let declaration = context.declarations.declare(function, None)?;
            let body = context.bodies.synthesize(&FunctionContext::free(function))?;
            write_definition(&mut writer, &declaration.definition(None), &body);
        }
        writer.line("} // extern \"C\"");
        Ok(context.artifact(context.aggregate_body_name(), ArtifactKind::AggregateBody, None, writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::config::GeneratorConfig;
    use crate::emitters::tests::fixture;
    use jitbind_common::Schema;

    fn emit(schema: &Schema, class: &str) -> ClassArtifacts {
        let catalog = TypeCatalog::new(schema, "TR");
        let config = GeneratorConfig::default();
        let context = EmitContext::new(schema, &config, &catalog, Dialect::Flat);
        FlatEmitter.emit_class(&context, schema.class(class).unwrap()).unwrap()
    }

    #[test]
    fn test_struct_repeats_superclass_members() {
        let schema = fixture();
        let header = emit(&schema, "MethodBuilder").header.contents;
        assert!(header.contains(
            "struct MethodBuilder {\n    void * _impl;\n    IlType * NoType;\n    void * buildIL;\n    void * RequestFunction;\n};\n"
        ));
        assert!(header.contains("extern int32_t MethodBuilder_count;"));
        assert!(header.contains("typedef int32_t (*MethodBuilder_RequestFunction_Callback)(MethodBuilder * self, const char * name);"));
    }

    #[test]
    fn test_inherited_functions_use_subclass_prefix() {
        let schema = fixture();
        let artifacts = emit(&schema, "MethodBuilder");
        assert!(artifacts.header.contents.contains("IlValue * MB_Add(MethodBuilder * self, IlValue * left, IlValue * right);"));
        assert!(artifacts.header.contents.contains("void MB_IfThen(MethodBuilder * self, IlBuilder ** thenPath, IlValue * condition);"));
        assert!(artifacts.body.contents.contains("IlValue * MB_Add(MethodBuilder * self, IlValue * left, IlValue * right)\n{\n"));
        // constructor, creator, destructor, DefineParameter, Add, IfThen
        assert_eq!(artifacts.function_count, 6);
    }

    #[test]
    fn test_header_typedefs_and_extras() {
        let schema = fixture();
        let artifacts = emit(&schema, "IlBuilder");
        let header = &artifacts.header.contents;
        for class in ["IlBuilder", "IlType", "IlValue"] {
            assert!(header.contains(&format!("typedef struct {class} {class};")), "missing typedef for {class}");
        }
        assert!(!header.contains("typedef struct TypeDictionary"));
        assert!(header.contains("#include \"IlBuilderExtras.h\""));
        assert!(header.contains("// Builds IL for one control flow region\nstruct IlBuilder {"));
        assert!(header.contains("// Sum of two values\nIlValue * IB_Add("));
        assert_eq!(artifacts.header.path, std::path::Path::new("c/IlBuilder.h"));
        assert_eq!(artifacts.body.path, std::path::Path::new("c/IlBuilder.cpp"));
    }

    #[test]
    fn test_body_defines_trampolines_before_c_linkage() {
        let schema = fixture();
        let body = emit(&schema, "MethodBuilder").body.contents;
        let trampoline = body.find("static bool MethodBuilderCallback_buildIL(void * clientObj)").unwrap();
        let linkage = body.find("extern \"C\" {").unwrap();
        assert!(trampoline < linkage);
        assert!(body.contains("static bool MethodBuilderCallback_RequestFunction(void * clientObj, const char * name)"));
        assert!(body.contains("int32_t MethodBuilder_count = 0;"));
        assert!(body.contains("#include \"ilgen/MethodBuilder.hpp\""));
    }

    #[test]
    fn test_aggregate_lists_every_class_and_free_function() {
        let schema = fixture();
        let catalog = TypeCatalog::new(&schema, "TR");
        let config = GeneratorConfig::default();
        let context = EmitContext::new(&schema, &config, &catalog, Dialect::Flat);

        let header = FlatEmitter.emit_aggregate_header(&context).unwrap().contents;
        for class in schema.classes() {
            assert!(header.contains(&format!("#include \"{}.h\"", class.name)));
        }
        assert!(header.contains("int32_t initializeJit(void);"));
        assert!(header.contains("int32_t compileMethodBuilder(MethodBuilder * method, void ** entry);"));

        let body = FlatEmitter.emit_aggregate_body(&context).unwrap().contents;
        assert!(body.contains("extern \"C\" bool internal_initializeJit();"));
        assert!(body.contains(
            "int32_t implRet = internal_compileMethodBuilder(static_cast<TR::MethodBuilder *>(JitBind::implOf(method)), entry);"
        ));
    }
}
