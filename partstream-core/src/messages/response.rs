//! Response message types from model interactions.
//!
//! A [`ModelResponse`] is the complete, ordered list of parts produced by a
//! model once its stream has been fully consumed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parts::{TextPart, ToolCallArgs, ToolCallPart};

/// A complete model response containing multiple parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The response parts, in stream position order.
    pub parts: Vec<ModelResponsePart>,
    /// Name of the model that generated this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// When this response was received.
    pub timestamp: DateTime<Utc>,
    /// Kind identifier.
    #[serde(default = "default_response_kind")]
    pub kind: String,
}

fn default_response_kind() -> String {
    "response".to_string()
}

impl ModelResponse {
    /// Create a new empty response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            model_name: None,
            timestamp: Utc::now(),
            kind: default_response_kind(),
        }
    }

    /// Create a response with the given parts.
    #[must_use]
    pub fn with_parts(parts: Vec<ModelResponsePart>) -> Self {
        Self {
            parts,
            ..Self::new()
        }
    }

    /// Create a simple text response.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_parts(vec![ModelResponsePart::Text(TextPart::new(content))])
    }

    /// Create a response holding a single tool call.
    #[must_use]
    pub fn from_tool_call(tool_call: ToolCallPart) -> Self {
        Self::with_parts(vec![ModelResponsePart::ToolCall(tool_call)])
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Get all text parts.
    pub fn text_parts(&self) -> impl Iterator<Item = &TextPart> {
        self.parts.iter().filter_map(|p| match p {
            ModelResponsePart::Text(t) => Some(t),
            ModelResponsePart::ToolCall(_) => None,
        })
    }

    /// Get all tool call parts.
    pub fn tool_call_parts(&self) -> impl Iterator<Item = &ToolCallPart> {
        self.parts.iter().filter_map(|p| match p {
            ModelResponsePart::ToolCall(t) => Some(t),
            ModelResponsePart::Text(_) => None,
        })
    }

    /// Get combined text content.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text_parts().map(|p| p.content.as_str()).collect()
    }

    /// Check if this response contains tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.parts.iter().any(ModelResponsePart::is_tool_call)
    }

    /// Check if the response is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Get the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }
}

impl Default for ModelResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<ModelResponsePart> for ModelResponse {
    fn from_iter<T: IntoIterator<Item = ModelResponsePart>>(iter: T) -> Self {
        Self::with_parts(iter.into_iter().collect())
    }
}

/// Individual parts of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum ModelResponsePart {
    /// Text content.
    Text(TextPart),
    /// Tool call.
    ToolCall(ToolCallPart),
}

impl ModelResponsePart {
    /// Create a text part.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextPart::new(content))
    }

    /// Create a tool call part.
    #[must_use]
    pub fn tool_call(tool_name: impl Into<String>, args: impl Into<ToolCallArgs>) -> Self {
        Self::ToolCall(ToolCallPart::new(tool_name, args))
    }

    /// Get the part kind.
    #[must_use]
    pub fn part_kind(&self) -> &'static str {
        match self {
            Self::Text(_) => TextPart::PART_KIND,
            Self::ToolCall(_) => ToolCallPart::PART_KIND,
        }
    }

    /// Check if this is a text part.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Check if this is a tool call part.
    #[must_use]
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall(_))
    }
}

impl From<TextPart> for ModelResponsePart {
    fn from(p: TextPart) -> Self {
        Self::Text(p)
    }
}

impl From<ToolCallPart> for ModelResponsePart {
    fn from(p: ToolCallPart) -> Self {
        Self::ToolCall(p)
    }
}
