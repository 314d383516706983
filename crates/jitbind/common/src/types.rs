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

//! Abstract API types
//!
//! Every parameter, field and return value in a schema carries an
//! [`AbstractType`]. Types have a compact textual notation used by API
//! descriptions:
//!
//! | notation | meaning |
//! |---|---|
//! | `none`, `boolean`, `int8` .. `int64`, `float`, `double` | primitive scalars |
//! | `pointer`, `ppointer` | opaque `void *` / `void **` |
//! | `constString`, `string` | C strings |
//! | `[int32]` | integer array |
//! | `K` | engine-backed object of class `K` |
//! | `&K` | object of class `K` passed by reference |
//! | `[K]` | array of `K` objects (input only) |
//! | `[&K]` | array of `K` objects written back after the call |
//! | `...` | variadic marker |

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract type of a value crossing the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbstractType {
    #[default]
    None,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Pointer,
    PPointer,
    ConstString,
    MutableString,
    Int32Array,
    Object(String),
    ObjectRef(String),
    ObjectArray(String),
    ObjectRefArray(String),
    Varargs,
}

const PRIMITIVES: &[(&str, AbstractType)] = &[
    ("none", AbstractType::None),
    ("boolean", AbstractType::Boolean),
    ("int8", AbstractType::Int8),
    ("int16", AbstractType::Int16),
    ("int32", AbstractType::Int32),
    ("int64", AbstractType::Int64),
    ("float", AbstractType::Float),
    ("double", AbstractType::Double),
    ("pointer", AbstractType::Pointer),
    ("ppointer", AbstractType::PPointer),
    ("constString", AbstractType::ConstString),
    ("string", AbstractType::MutableString),
    ("[int32]", AbstractType::Int32Array),
    ("...", AbstractType::Varargs),
];

impl AbstractType {
    /// Engine-backed object of the named class
    pub fn object(class: impl Into<String>) -> Self {
        Self::Object(class.into())
    }

    /// Object of the named class passed by reference
    pub fn object_ref(class: impl Into<String>) -> Self {
        Self::ObjectRef(class.into())
    }

    /// Input-only array of objects of the named class
    pub fn object_array(class: impl Into<String>) -> Self {
        Self::ObjectArray(class.into())
    }

    /// Array of objects of the named class, written back after the call
    pub fn object_ref_array(class: impl Into<String>) -> Self {
        Self::ObjectRefArray(class.into())
    }

    /// Whether values of this type are marshalled through a reference.
    ///
    /// True exactly for by-reference objects and the two object array kinds.
    pub fn is_passed_by_reference(&self) -> bool {
        matches!(self, Self::ObjectRef(_) | Self::ObjectArray(_) | Self::ObjectRefArray(_))
    }

    /// Whether a parameter of this type needs preparation before the engine call
    pub fn needs_marshalling(&self) -> bool {
        self.is_passed_by_reference() || self.is_varargs()
    }

    pub fn is_varargs(&self) -> bool {
        matches!(self, Self::Varargs)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Int32Array | Self::ObjectArray(_) | Self::ObjectRefArray(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Name of the engine-backed class this type refers to, if any
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(name) | Self::ObjectRef(name) | Self::ObjectArray(name) | Self::ObjectRefArray(name) => Some(name),
            _ => None,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

fn class_identifier(notation: &str, name: &str) -> Result<String, SchemaError> {
    if !is_identifier(name) {
        return Err(SchemaError::InvalidType {
            notation: notation.to_string(),
            reason: format!("'{name}' is not a valid class name"),
        });
    }
    if PRIMITIVES.iter().any(|(keyword, _)| *keyword == name) {
        return Err(SchemaError::InvalidType {
            notation: notation.to_string(),
            reason: format!("'{name}' is a primitive type, not a class"),
        });
    }
    Ok(name.to_string())
}

impl FromStr for AbstractType {
    type Err = SchemaError;

    fn from_str(notation: &str) -> Result<Self, Self::Err> {
        let text = notation.trim();
        if let Some((_, ty)) = PRIMITIVES.iter().find(|(keyword, _)| *keyword == text) {
            return Ok(ty.clone());
        }

        if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let inner = inner.trim();
            return match inner.strip_prefix('&') {
                Some(class) => Ok(Self::ObjectRefArray(class_identifier(notation, class.trim())?)),
                None => Ok(Self::ObjectArray(class_identifier(notation, inner)?)),
            };
        }

        if let Some(class) = text.strip_prefix('&') {
            return Ok(Self::ObjectRef(class_identifier(notation, class.trim())?));
        }

        Ok(Self::Object(class_identifier(notation, text)?))
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(name) => write!(f, "{name}"),
            Self::ObjectRef(name) => write!(f, "&{name}"),
            Self::ObjectArray(name) => write!(f, "[{name}]"),
            Self::ObjectRefArray(name) => write!(f, "[&{name}]"),
            other => {
                let keyword = PRIMITIVES.iter().find(|(_, ty)| ty == other).map(|(keyword, _)| *keyword).unwrap_or("?");
                f.write_str(keyword)
            }
        }
    }
}

impl TryFrom<String> for AbstractType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AbstractType> for String {
    fn from(ty: AbstractType) -> Self {
        ty.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!("int32".parse::<AbstractType>().unwrap(), AbstractType::Int32);
        assert_eq!("constString".parse::<AbstractType>().unwrap(), AbstractType::ConstString);
        assert_eq!("[int32]".parse::<AbstractType>().unwrap(), AbstractType::Int32Array);
        assert_eq!("...".parse::<AbstractType>().unwrap(), AbstractType::Varargs);
    }

    #[test]
    fn test_parse_objects() {
        assert_eq!("IlValue".parse::<AbstractType>().unwrap(), AbstractType::object("IlValue"));
        assert_eq!("&IlBuilder".parse::<AbstractType>().unwrap(), AbstractType::object_ref("IlBuilder"));
        assert_eq!("[IlValue]".parse::<AbstractType>().unwrap(), AbstractType::object_array("IlValue"));
        assert_eq!("[&IlBuilder]".parse::<AbstractType>().unwrap(), AbstractType::object_ref_array("IlBuilder"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<AbstractType>().is_err());
        assert!("&".parse::<AbstractType>().is_err());
        assert!("[&int32]".parse::<AbstractType>().is_err());
        assert!("9Lives".parse::<AbstractType>().is_err());
        assert!("Il Value".parse::<AbstractType>().is_err());
    }

    #[test]
    fn test_passed_by_reference_classification() {
        assert!(AbstractType::object_ref("IlBuilder").is_passed_by_reference());
        assert!(AbstractType::object_array("IlValue").is_passed_by_reference());
        assert!(AbstractType::object_ref_array("IlBuilder").is_passed_by_reference());
        assert!(!AbstractType::object("IlValue").is_passed_by_reference());
        assert!(!AbstractType::Int32Array.is_passed_by_reference());
        assert!(!AbstractType::Varargs.is_passed_by_reference());
        assert!(AbstractType::Varargs.needs_marshalling());
    }

    #[test]
    fn test_serde_uses_notation() {
        let ty: AbstractType = serde_json::from_str("\"[&IlBuilder]\"").unwrap();
        assert_eq!(ty, AbstractType::object_ref_array("IlBuilder"));
        assert_eq!(serde_json::to_string(&AbstractType::object_ref("IlBuilder")).unwrap(), "\"&IlBuilder\"");
    }

    fn any_type() -> impl Strategy<Value = AbstractType> {
        let class = "[A-Z][A-Za-z0-9_]{0,8}";
        prop_oneof![
            proptest::sample::select(PRIMITIVES.iter().map(|(_, ty)| ty.clone()).collect::<Vec<_>>()),
            class.prop_map(AbstractType::Object),
            class.prop_map(AbstractType::ObjectRef),
            class.prop_map(AbstractType::ObjectArray),
            class.prop_map(AbstractType::ObjectRefArray),
        ]
    }

    proptest! {
        #[test]
        fn notation_round_trips(ty in any_type()) {
            let parsed: AbstractType = ty.to_string().parse().unwrap();
            prop_assert_eq!(parsed, ty);
        }

        #[test]
        fn classification_is_stable(ty in any_type()) {
            prop_assert_eq!(ty.is_passed_by_reference(), ty.clone().is_passed_by_reference());
        }
    }
}
