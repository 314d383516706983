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

//! Output dialects

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two output code shapes generated from the same schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// C structs plus free functions
    Flat,
    /// C++ classes with native inheritance
    ObjectOriented,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Flat, Dialect::ObjectOriented];

    pub fn header_extension(self) -> &'static str {
        match self {
            Self::Flat => "h",
            Self::ObjectOriented => "hpp",
        }
    }

    /// Both dialects compile their bodies as C++
    pub fn body_extension(self) -> &'static str {
        "cpp"
    }

    /// Output subdirectory for artifacts of this dialect
    pub fn directory(self) -> &'static str {
        match self {
            Self::Flat => "c",
            Self::ObjectOriented => "cpp",
        }
    }

    pub fn is_flat(self) -> bool {
        self == Self::Flat
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::ObjectOriented => f.write_str("oo"),
        }
    }
}

impl FromStr for Dialect {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" | "c" => Ok(Self::Flat),
            "oo" | "object_oriented" | "cpp" => Ok(Self::ObjectOriented),
            other => Err(GenerationError::ConfigurationError(format!("Unknown dialect: {other}"))),
        }
    }
}
