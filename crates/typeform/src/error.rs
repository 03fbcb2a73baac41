// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for conversion, compilation and record access.

use std::fmt;

use serde_json::Value as Loose;
use thiserror::Error;

/// Conversion direction, used to qualify [`ConvertError::UnsupportedType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Loose value to typed value.
    Structure,
    /// Typed value to loose value.
    Unstructure,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Structure => write!(f, "structuring"),
            Direction::Unstructure => write!(f, "unstructuring"),
        }
    }
}

/// Errors produced while structuring, unstructuring or compiling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("cannot convert {value} to {target}: {reason}")]
    ConversionFailure {
        target: String,
        value: String,
        reason: String,
    },

    #[error("arity mismatch for {type_name}: expected {expected} elements, got {got}")]
    ArityMismatch {
        type_name: String,
        expected: usize,
        got: usize,
    },

    #[error("could not structure type: {type_name} from value: {value}")]
    UnionExhausted { type_name: String, value: String },

    #[error("no {direction} rule for type: {type_name}")]
    UnsupportedType {
        type_name: String,
        direction: Direction,
    },

    #[error("invalid record definition: {0}")]
    InvalidDefinition(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("cannot assign field {0} of a frozen instance")]
    FrozenInstance(String),

    #[error("text codec error: {0}")]
    Codec(String),

    /// An error raised while converting a nested field or element.
    #[error("{path}: {source}")]
    InField {
        path: String,
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Shorthand for a [`ConvertError::ConversionFailure`] on a loose input.
    pub fn conversion(target: impl Into<String>, value: &Loose, reason: impl Into<String>) -> Self {
        Self::ConversionFailure {
            target: target.into(),
            value: describe(value),
            reason: reason.into(),
        }
    }

    pub fn unsupported(type_name: impl Into<String>, direction: Direction) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            direction,
        }
    }

    /// Prefix the error path with a field name.
    ///
    /// Produces paths like `outer.inner[2].x`.
    pub fn in_field(self, name: &str) -> Self {
        self.prefixed(name.to_string())
    }

    /// Prefix the error path with a sequence index.
    pub fn in_index(self, index: usize) -> Self {
        self.prefixed(format!("[{index}]"))
    }

    fn prefixed(self, segment: String) -> Self {
        match self {
            Self::InField { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                Self::InField { path, source }
            }
            other => Self::InField {
                path: segment,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any field path stripped.
    pub fn root(&self) -> &ConvertError {
        match self {
            Self::InField { source, .. } => source.root(),
            other => other,
        }
    }

    /// Path of the field or element that failed, if nested.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InField { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

/// Text representation of a loose value for error messages.
///
/// Strings are shown without quotes.
pub(crate) fn describe(value: &Loose) -> String {
    match value {
        Loose::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_path() {
        let err = ConvertError::MissingField { field: "x".into() }
            .in_field("inner")
            .in_index(2)
            .in_field("items");
        assert_eq!(err.path(), Some("items[2].inner"));
        assert!(matches!(err.root(), ConvertError::MissingField { .. }));
        assert_eq!(
            err.to_string(),
            "items[2].inner: missing required field: x"
        );
    }

    #[test]
    fn test_describe_strips_quotes() {
        let err = ConvertError::conversion("int", &json!("abc"), "invalid digit");
        assert_eq!(err.to_string(), "cannot convert abc to int: invalid digit");

        let err = ConvertError::conversion("str", &json!([1, 2]), "not a scalar");
        assert_eq!(err.to_string(), "cannot convert [1,2] to str: not a scalar");
    }

    #[test]
    fn test_unsupported_message() {
        let err = ConvertError::unsupported("CapitalStr", Direction::Structure);
        assert_eq!(err.to_string(), "no structuring rule for type: CapitalStr");
    }
}
