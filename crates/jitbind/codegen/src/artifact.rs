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

//! Generated artifacts

use crate::dialect::Dialect;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ClassHeader,
    ClassBody,
    AggregateHeader,
    AggregateBody,
    SupportHeader,
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output root
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub dialect: Dialect,
    /// Class the artifact belongs to, if any
    pub owner: Option<String>,
    pub contents: String,
}

impl Artifact {
    pub fn size(&self) -> usize {
        self.contents.len()
    }

    pub fn is_header(&self) -> bool {
        matches!(
            self.kind,
            ArtifactKind::ClassHeader | ArtifactKind::AggregateHeader | ArtifactKind::SupportHeader
        )
    }
}

/// Header and body generated for one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassArtifacts {
    pub class: String,
    pub header: Artifact,
    pub body: Artifact,
    /// Function definitions in the body
    pub function_count: usize,
}

/// Everything generated for one dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectOutput {
    pub dialect: Dialect,
    /// Per-class artifacts in schema order
    pub classes: Vec<ClassArtifacts>,
    pub aggregate_header: Artifact,
    pub aggregate_body: Artifact,
    pub support_header: Artifact,
}

impl DialectOutput {
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.classes
            .iter()
            .flat_map(|c| [&c.header, &c.body])
            .chain([&self.aggregate_header, &self.aggregate_body, &self.support_header])
    }

    pub fn class(&self, name: &str) -> Option<&ClassArtifacts> {
        self.classes.iter().find(|c| c.class == name)
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts().map(Artifact::size).sum()
    }
}
