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

//! Common emitter trait

use super::EmitContext;
use super::support::emit_support_header;
use crate::artifact::{Artifact, ClassArtifacts, DialectOutput};
use crate::dialect::Dialect;
use crate::error::GenerationResult;
use jitbind_common::Class;
use rayon::prelude::*;
use tracing::debug;

/// Trait for rendering the schema into one dialect
pub trait DialectEmitter: Sync {
    /// The dialect this emitter produces
    fn dialect(&self) -> Dialect;

    /// Header and body of one class
    fn emit_class(&self, context: &EmitContext<'_>, class: &Class) -> GenerationResult<ClassArtifacts>;

    /// Header including every class header and declaring every free function
    fn emit_aggregate_header(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact>;

    /// Forwarding bodies of the free functions
    fn emit_aggregate_body(&self, context: &EmitContext<'_>) -> GenerationResult<Artifact>;

    /// Every artifact of the dialect. Classes are independent, so they may
    /// be emitted on the rayon pool; the output keeps schema order either way.
    fn emit_all(&self, context: &EmitContext<'_>, parallel: bool) -> GenerationResult<DialectOutput> {
        let classes = context.schema.classes();
        let emit = |class: &Class| {
            debug!(class = %class.name, dialect = %self.dialect(), "Emitting class");
            self.emit_class(context, class)
        };
        let classes = if parallel {
            classes.par_iter().map(emit).collect::<GenerationResult<Vec<_>>>()?
        } else {
            classes.iter().map(emit).collect::<GenerationResult<Vec<_>>>()?
        };

        Ok(DialectOutput {
            dialect: self.dialect(),
            classes,
            aggregate_header: self.emit_aggregate_header(context)?,
            aggregate_body: self.emit_aggregate_body(context)?,
            support_header: emit_support_header(context),
        })
    }
}
