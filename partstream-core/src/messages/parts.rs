//! Message part types for model responses.
//!
//! This module defines the materialized parts that make up a model response:
//! plain text and tool calls. Parts are plain values; streaming updates never
//! mutate them in place but produce a new part (see [`super::events`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ArgsKind, PartError, PartResult};

/// Text content part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text content.
    pub content: String,
}

impl TextPart {
    /// Part kind identifier.
    pub const PART_KIND: &'static str = "text";

    /// Create a new text part.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Get the part kind.
    #[must_use]
    pub fn part_kind(&self) -> &'static str {
        Self::PART_KIND
    }

    /// Check if the content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get the content length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }
}

impl From<String> for TextPart {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TextPart {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Tool call arguments, either as raw JSON text or as a decoded mapping.
///
/// The same type describes both the arguments of a materialized
/// [`ToolCallPart`] and an argument fragment carried by a
/// [`ToolCallPartDelta`](super::events::ToolCallPartDelta). Once a tool call
/// has a representation it keeps it: JSON fragments are concatenated and
/// structured fragments are merged key by key, never one into the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolCallArgs {
    /// Raw JSON text, possibly incomplete while streaming.
    Json(String),
    /// Decoded top-level object.
    Structured(Map<String, Value>),
}

impl ToolCallArgs {
    /// Create JSON text arguments.
    #[must_use]
    pub fn json(s: impl Into<String>) -> Self {
        Self::Json(s.into())
    }

    /// Create structured arguments.
    #[must_use]
    pub fn structured(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }

    /// Get the representation kind.
    #[must_use]
    pub fn kind(&self) -> ArgsKind {
        match self {
            Self::Json(_) => ArgsKind::Json,
            Self::Structured(_) => ArgsKind::Structured,
        }
    }

    /// Merge a later fragment into these arguments.
    ///
    /// JSON text is concatenated; mappings are merged by overwriting
    /// top-level keys. Mixing the two representations fails with
    /// [`PartError::ArgsRepresentationConflict`].
    pub fn merge(&self, fragment: &ToolCallArgs) -> PartResult<ToolCallArgs> {
        match (self, fragment) {
            (Self::Json(existing), Self::Json(more)) => {
                let mut joined = String::with_capacity(existing.len() + more.len());
                joined.push_str(existing);
                joined.push_str(more);
                Ok(Self::Json(joined))
            }
            (Self::Structured(existing), Self::Structured(patch)) => {
                let mut merged = existing.clone();
                for (key, value) in patch {
                    merged.insert(key.clone(), value.clone());
                }
                Ok(Self::Structured(merged))
            }
            (existing, incoming) => Err(PartError::args_conflict(existing.kind(), incoming.kind())),
        }
    }

    /// Render the arguments as a JSON string.
    ///
    /// JSON text is returned as-is (even if incomplete); a mapping is serialized.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        match self {
            Self::Json(s) => s.clone(),
            Self::Structured(map) => Value::Object(map.clone()).to_string(),
        }
    }

    /// Decode the arguments into a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PartError::MalformedArguments`] if JSON text does not parse,
    /// or parses to something other than an object.
    pub fn to_map(&self) -> PartResult<Map<String, Value>> {
        match self {
            Self::Structured(map) => Ok(map.clone()),
            Self::Json(s) => match serde_json::from_str::<Value>(s)? {
                Value::Object(map) => Ok(map),
                other => Err(PartError::MalformedArguments(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                ))),
            },
        }
    }

    /// Check whether the arguments carry anything meaningful.
    ///
    /// JSON text counts when non-empty; a mapping counts when at least one
    /// value is truthy (not null, false, zero, or an empty string/array/object).
    #[must_use]
    pub fn has_content(&self) -> bool {
        match self {
            Self::Json(s) => !s.is_empty(),
            Self::Structured(map) => map.values().any(is_truthy),
        }
    }
}

impl From<String> for ToolCallArgs {
    fn from(s: String) -> Self {
        Self::Json(s)
    }
}

impl From<&str> for ToolCallArgs {
    fn from(s: &str) -> Self {
        Self::Json(s.to_string())
    }
}

impl From<Map<String, Value>> for ToolCallArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Tool call part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Name of the tool being called.
    pub tool_name: String,
    /// Arguments for the tool call.
    pub args: ToolCallArgs,
    /// Unique identifier for this tool call (provider-assigned).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ToolCallPart {
    /// Part kind identifier.
    pub const PART_KIND: &'static str = "tool-call";

    /// Create a new tool call part.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, args: impl Into<ToolCallArgs>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args: args.into(),
            tool_call_id: None,
        }
    }

    /// Create a tool call with JSON text arguments.
    #[must_use]
    pub fn from_json(
        tool_name: impl Into<String>,
        args_json: impl Into<String>,
        tool_call_id: Option<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            args: ToolCallArgs::Json(args_json.into()),
            tool_call_id,
        }
    }

    /// Create a tool call with structured arguments.
    #[must_use]
    pub fn from_dict(
        tool_name: impl Into<String>,
        args: Map<String, Value>,
        tool_call_id: Option<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            args: ToolCallArgs::Structured(args),
            tool_call_id,
        }
    }

    /// Get the part kind.
    #[must_use]
    pub fn part_kind(&self) -> &'static str {
        Self::PART_KIND
    }

    /// Set the tool call ID (provider-assigned identifier for the tool call).
    #[must_use]
    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Get arguments as a JSON string.
    ///
    /// Not cached; callers that need it repeatedly should keep the result.
    #[must_use]
    pub fn args_as_json_str(&self) -> String {
        self.args.to_json_string()
    }

    /// Get arguments as a decoded mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PartError::MalformedArguments`] if JSON text arguments are
    /// not a well-formed object.
    pub fn args_as_dict(&self) -> PartResult<Map<String, Value>> {
        self.args.to_map()
    }

    /// Try to deserialize arguments into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns [`PartError::MalformedArguments`] if the arguments cannot be
    /// decoded or do not match `T`.
    pub fn parse_args<T: for<'de> Deserialize<'de>>(&self) -> PartResult<T> {
        let map = self.args_as_dict()?;
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Check whether the call carries meaningful arguments.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.args.has_content()
    }
}
