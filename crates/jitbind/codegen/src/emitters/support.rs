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

//! Pairing support header
//!
//! A wrapper and its backing object point at each other: the wrapper through
//! its `_impl` member, the backing object through the engine's client slot.
//! Generated bodies never touch either side directly; they go through the
//! three helpers emitted here, which check the association at the boundary.

use super::EmitContext;
use crate::artifact::{Artifact, ArtifactKind};
use crate::body::SUPPORT_NAMESPACE;

const HELPERS: &str = r#"// Wrapper paired with a backing object. Aborts when the object has none.
template <typename Client, typename Impl>
inline Client * clientOf(Impl * impl)
{
    if (impl == NULL)
        return NULL;
    void * client = impl->client();
    if (client == NULL) {
        fprintf(stderr, "jitbind: backing object %p has no paired wrapper\n", static_cast<void *>(impl));
        abort();
    }
    return static_cast<Client *>(client);
}

// Pair a backing object with its wrapper. Aborts when it is already paired
// with a different one.
template <typename Impl, typename Client>
inline void pairWith(Impl * impl, Client * client)
{
    void * current = impl->client();
    if (current != NULL && current != static_cast<void *>(client)) {
        fprintf(stderr, "jitbind: backing object %p is already paired with %p\n", static_cast<void *>(impl), current);
        abort();
    }
    impl->setClient(static_cast<void *>(client));
}

// Backing object of a wrapper
template <typename Client>
inline void * implOf(Client * client)
{
    return client != NULL ? client->_impl : NULL;
}
"#;

/// The support header, identical in both dialects
pub fn emit_support_header(context: &EmitContext<'_>) -> Artifact {
    let guard = format!("{}_INCLUDED", context.config.support_header_name.to_uppercase());
    let mut writer = context.writer();
    writer.line(format!("#ifndef {guard}"));
    writer.line(format!("#define {guard}"));
    writer.blank();
    writer.line("#include <cstdio>");
    writer.line("#include <cstdlib>");
    writer.blank();
    writer.line(format!("namespace {SUPPORT_NAMESPACE} {{"));
    writer.blank();
    writer.raw(HELPERS);
    writer.blank();
    writer.line(format!("}} // namespace {SUPPORT_NAMESPACE}"));
    writer.blank();
    writer.line(format!("#endif // {guard}"));
    context.artifact(context.support_header_name(), ArtifactKind::SupportHeader, None, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::config::GeneratorConfig;
    use crate::dialect::Dialect;
    use crate::emitters::tests::fixture;
    use std::path::Path;

    #[test]
    fn test_support_header_helpers() {
        let schema = fixture();
        let catalog = TypeCatalog::new(&schema, "TR");
        let config = GeneratorConfig::default();
        let artifact = emit_support_header(&EmitContext::new(&schema, &config, &catalog, Dialect::ObjectOriented));

        assert_eq!(artifact.path, Path::new("cpp/BindingSupport.hpp"));
        assert!(artifact.contents.starts_with("// Generated by jitbind. Do not edit.\n"));
        assert!(artifact.contents.contains("#ifndef BINDINGSUPPORT_INCLUDED"));
        for helper in ["clientOf(Impl * impl)", "pairWith(Impl * impl, Client * client)", "implOf(Client * client)"] {
            assert!(artifact.contents.contains(helper), "missing {helper}");
        }
        assert_eq!(artifact.contents.matches("abort();").count(), 2);
    }
}
