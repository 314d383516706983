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

//! Callback trampolines
//!
//! The engine invokes callbacks through a plain function pointer and the
//! wrapper paired with the backing object as context. A trampoline recovers
//! the wrapper, resolves object parameters to wrappers and dispatches to the
//! user implementation: a virtual call in the object-oriented dialect, the
//! callback slot in the flat dialect.

use super::{Body, BodySynthesizer, FunctionContext, Phase};
use crate::declaration::{CLIENT_PARAMETER, callback_type_name, trampoline_name};
use crate::dialect::Dialect;
use crate::error::{GenerationError, GenerationResult};
use jitbind_common::{Class, Function, FunctionKind};

/// Statement installing the trampoline of `callback` on the backing object
pub(super) fn trampoline_registration(class: &Class, callback: &str) -> String {
    format!(
        "{}->setClientCallback_{callback}(reinterpret_cast<void *>(&{}));",
        super::BACKING,
        trampoline_name(class, callback)
    )
}

/// A callback trampoline to emit into a class body
#[derive(Debug, Clone, Copy)]
pub struct Trampoline<'a> {
    /// Class whose body defines and registers the trampoline
    pub class: &'a Class,
    /// Class that declared the callback slot
    pub slot_owner: &'a Class,
    pub callback: &'a Function,
}

impl<'a> BodySynthesizer<'a> {
    /// Trampolines `class` registers: every slot of its flattened layout in
    /// the flat dialect, its own callbacks in the object-oriented dialect
    pub fn trampolines(&self, class: &'a Class) -> GenerationResult<Vec<Trampoline<'a>>> {
        match self.dialect {
            Dialect::ObjectOriented => Ok(class
                .callbacks()
                .map(|callback| Trampoline {
                    class,
                    slot_owner: class,
                    callback,
                })
                .collect()),
            Dialect::Flat => {
                let layout = self.flattener.flatten(class)?;
                layout
                    .callback_slots()
                    .map(|slot| -> GenerationResult<Trampoline<'a>> {
                        let owner = slot.owner().unwrap_or(&class.name);
                        let slot_owner = self
                            .schema
                            .class(owner)
                            .ok_or_else(|| GenerationError::inconsistency(owner, "callback slot owner not found"))?;
                        let callback = slot_owner.callbacks().find(|f| f.name == slot.name()).ok_or_else(|| {
                            GenerationError::inconsistency(format!("{owner}::{}", slot.name()), "callback slot without callback")
                        })?;
                        Ok(Trampoline {
                            class,
                            slot_owner,
                            callback,
                        })
                    })
                    .collect()
            }
        }
    }

    /// Body of a trampoline
    pub fn trampoline_body(&self, trampoline: &Trampoline<'_>) -> GenerationResult<Body> {
        let Trampoline { class, slot_owner, callback } = *trampoline;
        let mut body = Body::default();

        let mut args = Vec::with_capacity(callback.parameters.len() + 1);
        if self.dialect.is_flat() {
            args.push(if slot_owner.name == class.name {
                "client".to_string()
            } else {
                format!("reinterpret_cast<{} *>(client)", slot_owner.name)
            });
        }
        for parameter in &callback.parameters {
            if parameter.ty.needs_marshalling() {
                return Err(GenerationError::inconsistency(
                    format!("{}::{}", slot_owner.name, callback.name),
                    "callback parameters cannot be marshalled",
                ));
            }
            args.push(self.surface_value(&parameter.ty, &parameter.name)?);
        }

        let invoke = body.block_mut(Phase::Invoke);
        invoke.line(format!("{0} * client = static_cast<{0} *>({CLIENT_PARAMETER});", class.name));
        let call = match self.dialect {
            Dialect::ObjectOriented => format!("client->{}({})", callback.name, args.join(", ")),
            Dialect::Flat => {
                let pointer_type = callback_type_name(slot_owner, callback);
                invoke.line(format!("{pointer_type} callback = reinterpret_cast<{pointer_type}>(client->{});", callback.name));
                invoke.line("if (callback == NULL)");
                match self.catalog.zero_value(&callback.return_type)? {
                    Some(zero) => invoke.nested(1, format!("return {zero};")),
                    None => invoke.nested(1, "return;"),
                }
                format!("callback({})", args.join(", "))
            }
        };

        let ret = body.block_mut(Phase::Return);
        if callback.return_type.is_void() {
            ret.line(format!("{call};"));
        } else {
            let value = self.engine_value(&callback.return_type, &call)?;
            ret.line(format!("return {value};"));
        }
        Ok(body)
    }

    /// Default implementation of an object-oriented callback
    pub(super) fn callback_default(&self, context: &FunctionContext<'_>) -> GenerationResult<Body> {
        let function = context.function;
        if self.dialect.is_flat() || function.kind != FunctionKind::Callback {
            return Err(GenerationError::inconsistency(
                context.location(),
                "flat callbacks live in slots and have no body",
            ));
        }
        let mut body = Body::default();
        if let Some(zero) = self.catalog.zero_value(&function.return_type)? {
            body.block_mut(Phase::Return).line(format!("return {zero};"));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::synthesize;
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::config::GeneratorConfig;
    use jitbind_common::{AbstractType, Schema};

    fn schema() -> Schema {
        Schema::builder()
            .class(Class::new("IlValue", "IV"))
            .class(
                Class::new("IlBuilder", "IB")
                    .function(Function::new("buildIL", AbstractType::Boolean).callback()),
            )
            .class(
                Class::new("MethodBuilder", "MB")
                    .extends("IlBuilder")
                    .function(Function::new("buildIL", AbstractType::Boolean).callback())
                    .function(
                        Function::new("RequestFunction", AbstractType::object("IlValue"))
                            .callback()
                            .param("name", AbstractType::ConstString)
                            .param("hint", AbstractType::object("IlValue")),
                    ),
            )
            .build()
            .unwrap()
    }

    fn trampoline_texts(schema: &Schema, dialect: Dialect, class: &str) -> Vec<(String, String)> {
        let catalog = TypeCatalog::new(schema, "TR");
        let config = GeneratorConfig::default();
        let synthesizer = BodySynthesizer::new(schema, &catalog, &config, dialect);
        let class = schema.class(class).unwrap();
        synthesizer
            .trampolines(class)
            .unwrap()
            .iter()
            .map(|t| (t.slot_owner.name.clone(), synthesizer.trampoline_body(t).unwrap().text()))
            .collect()
    }

    #[test]
    fn test_flat_trampolines_cover_every_slot() {
        let schema = schema();
        let trampolines = trampoline_texts(&schema, Dialect::Flat, "MethodBuilder");
        let owners: Vec<_> = trampolines.iter().map(|(owner, _)| owner.as_str()).collect();
        assert_eq!(owners, ["IlBuilder", "MethodBuilder"]);

        assert_eq!(
            trampolines[0].1,
            "MethodBuilder * client = static_cast<MethodBuilder *>(clientObj);\n\
             IlBuilder_buildIL_Callback callback = reinterpret_cast<IlBuilder_buildIL_Callback>(client->buildIL);\n\
             if (callback == NULL)\n    return 0;\n\
             return static_cast<bool>(callback(reinterpret_cast<IlBuilder *>(client)));\n"
        );
        assert!(trampolines[1].1.contains(
            "return static_cast<TR::IlValue *>(JitBind::implOf(callback(client, name, JitBind::clientOf<IlValue>(hint))));"
        ));
    }

    #[test]
    fn test_object_trampoline_dispatches_virtually() {
        let schema = schema();
        let trampolines = trampoline_texts(&schema, Dialect::ObjectOriented, "MethodBuilder");
        assert_eq!(trampolines.len(), 2);
        assert_eq!(
            trampolines[0].1,
            "MethodBuilder * client = static_cast<MethodBuilder *>(clientObj);\nreturn static_cast<bool>(client->buildIL());\n"
        );
    }

    #[test]
    fn test_object_callback_default_returns_zero() {
        let schema = schema();
        let body = synthesize(&schema, Dialect::ObjectOriented, "IlBuilder", "buildIL").unwrap();
        assert_eq!(body.text(), "return 0;\n");
        assert!(synthesize(&schema, Dialect::Flat, "IlBuilder", "buildIL").is_err());
    }

    #[test]
    fn test_registration_statement() {
        let class = Class::new("IlBuilder", "IB");
        assert_eq!(
            trampoline_registration(&class, "buildIL"),
            "implObj->setClientCallback_buildIL(reinterpret_cast<void *>(&IlBuilderCallback_buildIL));"
        );
    }
}
