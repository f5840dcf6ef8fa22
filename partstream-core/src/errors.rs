//! Error types for merging streamed parts.
//!
//! Every merge operator and parts-manager operation fails with a [`PartError`].
//! All variants are fatal for the fragment that triggered them: the target
//! part (or pending delta) is left exactly as it was before the call.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Representation of tool call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgsKind {
    /// Raw JSON text, concatenated fragment by fragment.
    Json,
    /// Decoded key/value mapping, merged by shallow key overwrite.
    Structured,
}

impl fmt::Display for ArgsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Structured => f.write_str("structured"),
        }
    }
}

/// Error raised while merging a fragment into a part or pending delta.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartError {
    /// A fragment for one part kind targeted a part of another kind.
    #[error("Cannot apply a {found} fragment to a {expected} part")]
    TypeMismatch {
        /// Kind of the part already stored.
        expected: &'static str,
        /// Kind of the incoming fragment.
        found: &'static str,
    },

    /// Argument fragment uses a different representation than the part.
    #[error("Cannot merge {incoming} tool arguments into {existing} tool arguments")]
    ArgsRepresentationConflict {
        /// Representation already fixed on the part.
        existing: ArgsKind,
        /// Representation of the incoming fragment.
        incoming: ArgsKind,
    },

    /// Fragment tried to replace an already fixed tool call ID.
    #[error("Tool call ID conflict: part has {existing:?}, fragment has {incoming:?}")]
    CallIdConflict {
        /// The ID already fixed on the part.
        existing: String,
        /// The conflicting ID carried by the fragment.
        incoming: String,
    },

    /// JSON arguments could not be decoded into an object.
    #[error("Malformed tool arguments: {0}")]
    MalformedArguments(String),
}

impl PartError {
    /// Create a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Create an args representation conflict.
    #[must_use]
    pub fn args_conflict(existing: ArgsKind, incoming: ArgsKind) -> Self {
        Self::ArgsRepresentationConflict { existing, incoming }
    }

    /// Create a tool call ID conflict.
    #[must_use]
    pub fn call_id_conflict(existing: impl Into<String>, incoming: impl Into<String>) -> Self {
        Self::CallIdConflict {
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }
}

impl From<serde_json::Error> for PartError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedArguments(err.to_string())
    }
}

/// Result type for merge operations.
pub type PartResult<T> = std::result::Result<T, PartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PartError::type_mismatch("text", "tool-call");
        assert_eq!(err.to_string(), "Cannot apply a tool-call fragment to a text part");

        let err = PartError::args_conflict(ArgsKind::Structured, ArgsKind::Json);
        assert_eq!(
            err.to_string(),
            "Cannot merge json tool arguments into structured tool arguments"
        );

        let err = PartError::call_id_conflict("call_1", "call_2");
        assert_eq!(
            err.to_string(),
            r#"Tool call ID conflict: part has "call_1", fragment has "call_2""#
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PartError = err.into();
        assert!(matches!(err, PartError::MalformedArguments(_)));
    }
}
