//! Streaming deltas and events for model responses.
//!
//! A delta describes an incremental update to one response part. Deltas are
//! merged functionally: applying a delta to a part (or folding it into a
//! still-pending delta) returns a new value and leaves the input untouched,
//! so a failed merge never leaves a half-updated part behind.
//!
//! The merge rules are the same whether the target is a part or a pending
//! delta:
//!
//! - text and tool names grow by appending;
//! - JSON argument text is concatenated, structured arguments are merged by
//!   top-level key, and the two representations never mix;
//! - a tool call ID, once set to a non-empty value, can only be repeated.

use serde::{Deserialize, Serialize};

use super::parts::{TextPart, ToolCallArgs, ToolCallPart};
use super::response::ModelResponsePart;
use crate::errors::{PartError, PartResult};

/// Stream event for model responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum ModelResponseStreamEvent {
    /// A new part has started.
    PartStart(PartStartEvent),
    /// Delta for an existing part.
    PartDelta(PartDeltaEvent),
    /// A part has ended.
    PartEnd(PartEndEvent),
}

impl ModelResponseStreamEvent {
    /// Create a part start event.
    #[must_use]
    pub fn part_start(index: usize, part: ModelResponsePart) -> Self {
        Self::PartStart(PartStartEvent { index, part })
    }

    /// Create a part delta event.
    #[must_use]
    pub fn part_delta(index: usize, delta: ModelResponsePartDelta) -> Self {
        Self::PartDelta(PartDeltaEvent { index, delta })
    }

    /// Create a text delta event.
    #[must_use]
    pub fn text_delta(index: usize, content_delta: impl Into<String>) -> Self {
        Self::part_delta(
            index,
            ModelResponsePartDelta::Text(TextPartDelta::new(content_delta)),
        )
    }

    /// Create a tool call delta event.
    #[must_use]
    pub fn tool_call_delta(index: usize, delta: ToolCallPartDelta) -> Self {
        Self::part_delta(index, ModelResponsePartDelta::ToolCall(delta))
    }

    /// Create a part end event.
    #[must_use]
    pub fn part_end(index: usize, part: ModelResponsePart) -> Self {
        Self::PartEnd(PartEndEvent { index, part })
    }

    /// Get the part index.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::PartStart(e) => e.index,
            Self::PartDelta(e) => e.index,
            Self::PartEnd(e) => e.index,
        }
    }

    /// Check if this is a start event.
    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Self::PartStart(_))
    }

    /// Check if this is a delta event.
    #[must_use]
    pub fn is_delta(&self) -> bool {
        matches!(self, Self::PartDelta(_))
    }

    /// Check if this is an end event.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::PartEnd(_))
    }
}

/// Event indicating a new part has started.
///
/// Emitted exactly once per position, the first time the part there is
/// complete enough to be interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartStartEvent {
    /// Index of the part in the response.
    pub index: usize,
    /// The full part as of this event.
    pub part: ModelResponsePart,
}

impl PartStartEvent {
    /// Create a new part start event.
    #[must_use]
    pub fn new(index: usize, part: ModelResponsePart) -> Self {
        Self { index, part }
    }
}

/// Event containing a delta update for a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDeltaEvent {
    /// Index of the part being updated.
    pub index: usize,
    /// The delta content.
    pub delta: ModelResponsePartDelta,
}

impl PartDeltaEvent {
    /// Create a new delta event.
    #[must_use]
    pub fn new(index: usize, delta: ModelResponsePartDelta) -> Self {
        Self { index, delta }
    }
}

/// Event indicating a part will receive no further updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEndEvent {
    /// Index of the part that ended.
    pub index: usize,
    /// The final part.
    pub part: ModelResponsePart,
}

impl PartEndEvent {
    /// Create a new part end event.
    #[must_use]
    pub fn new(index: usize, part: ModelResponsePart) -> Self {
        Self { index, part }
    }
}

/// Delta content for different part types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_delta_kind", rename_all = "snake_case")]
pub enum ModelResponsePartDelta {
    /// Text content delta.
    Text(TextPartDelta),
    /// Tool call delta.
    ToolCall(ToolCallPartDelta),
}

impl ModelResponsePartDelta {
    /// Kind of part this delta applies to.
    #[must_use]
    pub fn part_kind(&self) -> &'static str {
        match self {
            Self::Text(_) => TextPart::PART_KIND,
            Self::ToolCall(_) => ToolCallPart::PART_KIND,
        }
    }

    /// Check if this is a text delta.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Check if this is a tool call delta.
    #[must_use]
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall(_))
    }

    /// Get the content delta if applicable.
    #[must_use]
    pub fn content_delta(&self) -> Option<&str> {
        match self {
            Self::Text(d) => Some(&d.content_delta),
            Self::ToolCall(_) => None,
        }
    }

    /// Apply this delta to a part of the matching kind.
    ///
    /// # Errors
    ///
    /// Returns [`PartError::TypeMismatch`] if the part is of another kind, or
    /// any error of [`ToolCallPartDelta::apply`].
    pub fn apply(&self, part: &ModelResponsePart) -> PartResult<ModelResponsePart> {
        match (self, part) {
            (Self::Text(delta), ModelResponsePart::Text(text)) => {
                Ok(ModelResponsePart::Text(delta.apply(text)))
            }
            (Self::ToolCall(delta), ModelResponsePart::ToolCall(call)) => {
                delta.apply(call).map(ModelResponsePart::ToolCall)
            }
            (delta, part) => Err(PartError::type_mismatch(part.part_kind(), delta.part_kind())),
        }
    }
}

/// Delta for text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPartDelta {
    /// Text appended to the part's content.
    pub content_delta: String,
}

impl TextPartDelta {
    /// Create a new text delta.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content_delta: content.into(),
        }
    }

    /// Check if the delta is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_delta.is_empty()
    }

    /// Apply this delta to a text part, returning the updated part.
    #[must_use]
    pub fn apply(&self, part: &TextPart) -> TextPart {
        let mut content = String::with_capacity(part.content.len() + self.content_delta.len());
        content.push_str(&part.content);
        content.push_str(&self.content_delta);
        TextPart { content }
    }
}

/// Delta for a tool call.
///
/// Every field is optional; an absent field means "no change". While a tool
/// call is missing its name or arguments, the accumulated delta itself is kept
/// as the pending state and later fragments are [folded](Self::fold) into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPartDelta {
    /// Text appended to the tool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name_delta: Option<String>,
    /// Argument fragment: JSON text to append or a mapping to merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_delta: Option<ToolCallArgs>,
    /// Provider-assigned tool call ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ToolCallPartDelta {
    /// Create a delta from its optional fields.
    #[must_use]
    pub fn new(
        tool_name_delta: Option<String>,
        args_delta: Option<ToolCallArgs>,
        tool_call_id: Option<String>,
    ) -> Self {
        Self {
            tool_name_delta,
            args_delta,
            tool_call_id,
        }
    }

    /// Set the tool name delta.
    #[must_use]
    pub fn with_tool_name_delta(mut self, name: impl Into<String>) -> Self {
        self.tool_name_delta = Some(name.into());
        self
    }

    /// Set the arguments delta.
    #[must_use]
    pub fn with_args_delta(mut self, args: impl Into<ToolCallArgs>) -> Self {
        self.args_delta = Some(args.into());
        self
    }

    /// Set the tool call ID.
    #[must_use]
    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Check if the delta is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tool_name_delta.is_none() && self.args_delta.is_none() && self.tool_call_id.is_none()
    }

    /// Apply this delta to a tool call part, returning the updated part.
    ///
    /// # Errors
    ///
    /// - [`PartError::ArgsRepresentationConflict`] if the argument fragment
    ///   uses a different representation than the part.
    /// - [`PartError::CallIdConflict`] if the part already has a different
    ///   non-empty tool call ID.
    pub fn apply(&self, part: &ToolCallPart) -> PartResult<ToolCallPart> {
        let args = match &self.args_delta {
            Some(fragment) => part.args.merge(fragment)?,
            None => part.args.clone(),
        };
        let tool_call_id =
            merge_tool_call_id(part.tool_call_id.as_ref(), self.tool_call_id.as_ref())?;

        let mut tool_name = part.tool_name.clone();
        if let Some(name) = &self.tool_name_delta {
            tool_name.push_str(name);
        }

        Ok(ToolCallPart {
            tool_name,
            args,
            tool_call_id,
        })
    }

    /// Fold this delta into a pending (not yet materialized) delta.
    ///
    /// Uses the same merge rules and failure conditions as [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn fold(&self, pending: &ToolCallPartDelta) -> PartResult<ToolCallPartDelta> {
        let args_delta = match (&pending.args_delta, &self.args_delta) {
            (Some(existing), Some(fragment)) => Some(existing.merge(fragment)?),
            (existing, fragment) => fragment.clone().or_else(|| existing.clone()),
        };
        let tool_call_id =
            merge_tool_call_id(pending.tool_call_id.as_ref(), self.tool_call_id.as_ref())?;

        let tool_name_delta = match (&pending.tool_name_delta, &self.tool_name_delta) {
            (Some(existing), Some(more)) => Some(format!("{existing}{more}")),
            (existing, more) => more.clone().or_else(|| existing.clone()),
        };

        Ok(ToolCallPartDelta {
            tool_name_delta,
            args_delta,
            tool_call_id,
        })
    }

    /// Materialize this delta into a tool call part.
    ///
    /// Returns `None` until the delta carries both a non-empty tool name and
    /// arguments.
    #[must_use]
    pub fn as_part(&self) -> Option<ToolCallPart> {
        let tool_name = self.tool_name_delta.as_ref().filter(|n| !n.is_empty())?;
        let args = self.args_delta.as_ref()?;
        Some(ToolCallPart {
            tool_name: tool_name.clone(),
            args: args.clone(),
            tool_call_id: self.tool_call_id.clone(),
        })
    }
}

/// Resolve the tool call ID after a merge.
///
/// An empty incoming ID is treated as absent. A non-empty existing ID may
/// only be repeated, never replaced.
fn merge_tool_call_id(
    existing: Option<&String>,
    incoming: Option<&String>,
) -> PartResult<Option<String>> {
    match (existing, incoming) {
        (_, None) => Ok(existing.cloned()),
        (_, Some(new)) if new.is_empty() => Ok(existing.cloned()),
        (Some(old), Some(new)) if !old.is_empty() && old != new => {
            Err(PartError::call_id_conflict(old.as_str(), new.as_str()))
        }
        (_, Some(new)) => Ok(Some(new.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ArgsKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Map, Value};

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_text_delta_apply() {
        let part = TextPart::new("Hello");
        let updated = TextPartDelta::new(" world").apply(&part);
        assert_eq!(updated.content, "Hello world");
        // Input is untouched.
        assert_eq!(part.content, "Hello");
    }

    #[test]
    fn test_part_delta_type_mismatch() {
        let text = ModelResponsePart::text("Hello");
        let delta = ModelResponsePartDelta::ToolCall(ToolCallPartDelta::default().with_args_delta("{"));
        assert_eq!(
            delta.apply(&text),
            Err(PartError::type_mismatch("text", "tool-call"))
        );

        let call = ModelResponsePart::tool_call("search", "{}");
        let delta = ModelResponsePartDelta::Text(TextPartDelta::new("x"));
        assert_eq!(
            delta.apply(&call),
            Err(PartError::type_mismatch("tool-call", "text"))
        );
    }

    #[test]
    fn test_part_delta_apply_matching_kind() {
        let text = ModelResponsePart::text("Hel");
        let delta = ModelResponsePartDelta::Text(TextPartDelta::new("lo"));
        assert_eq!(delta.apply(&text).unwrap(), ModelResponsePart::text("Hello"));
    }

    #[test]
    fn test_tool_call_delta_apply_json_args() {
        let part = ToolCallPart::from_json("get_weather", r#"{"city":"#, None);
        let delta = ToolCallPartDelta::default()
            .with_args_delta(r#""NYC"}"#)
            .with_tool_call_id("call_123");

        let updated = delta.apply(&part).unwrap();
        assert_eq!(updated.args, ToolCallArgs::json(r#"{"city":"NYC"}"#));
        assert_eq!(updated.tool_call_id.as_deref(), Some("call_123"));
        assert_eq!(updated.tool_name, "get_weather");
    }

    #[test]
    fn test_tool_call_delta_appends_name() {
        let part = ToolCallPart::from_json("get_", "{}", None);
        let updated = ToolCallPartDelta::default()
            .with_tool_name_delta("weather")
            .apply(&part)
            .unwrap();
        assert_eq!(updated.tool_name, "get_weather");
    }

    #[test]
    fn test_tool_call_delta_structured_args() {
        let part = ToolCallPart::from_dict("search", map(json!({"q": "rust", "page": 1})), None);
        let updated = ToolCallPartDelta::default()
            .with_args_delta(map(json!({"page": 2})))
            .apply(&part)
            .unwrap();
        assert_eq!(updated.args_as_dict().unwrap(), map(json!({"q": "rust", "page": 2})));
    }

    #[test]
    fn test_tool_call_delta_args_conflict_leaves_part() {
        let part = ToolCallPart::from_dict("search", map(json!({"q": "rust"})), None);
        let before = part.clone();

        let err = ToolCallPartDelta::default()
            .with_args_delta("{}")
            .apply(&part)
            .unwrap_err();

        assert_eq!(err, PartError::args_conflict(ArgsKind::Structured, ArgsKind::Json));
        assert_eq!(part, before);
    }

    #[rstest]
    #[case::same_id(Some("call_1"), Some("call_1"), Ok(Some("call_1")))]
    #[case::set_when_absent(None, Some("call_1"), Ok(Some("call_1")))]
    #[case::set_when_empty(Some(""), Some("call_1"), Ok(Some("call_1")))]
    #[case::keep_when_absent(Some("call_1"), None, Ok(Some("call_1")))]
    #[case::keep_when_incoming_empty(Some("call_1"), Some(""), Ok(Some("call_1")))]
    #[case::conflict(Some("call_1"), Some("call_2"), Err(PartError::call_id_conflict("call_1", "call_2")))]
    fn test_tool_call_id_rules(
        #[case] existing: Option<&str>,
        #[case] incoming: Option<&str>,
        #[case] expected: PartResult<Option<&str>>,
    ) {
        let mut part = ToolCallPart::from_json("tool", "{}", None);
        part.tool_call_id = existing.map(String::from);
        let delta = ToolCallPartDelta::new(None, None, incoming.map(String::from));

        let result = delta.apply(&part).map(|p| p.tool_call_id);
        let expected = expected.map(|id| id.map(String::from));
        assert_eq!(result, expected);

        // Folding into a pending delta follows the same rules.
        let pending = ToolCallPartDelta::new(None, None, existing.map(String::from));
        let folded = delta.fold(&pending).map(|d| d.tool_call_id);
        assert_eq!(folded, expected);
    }

    #[test]
    fn test_fold_combines_name_and_args() {
        let pending = ToolCallPartDelta::default().with_tool_name_delta("get_");
        let delta = ToolCallPartDelta::default()
            .with_tool_name_delta("weather")
            .with_args_delta(r#"{"city":"#);

        let folded = delta.fold(&pending).unwrap();
        assert_eq!(folded.tool_name_delta.as_deref(), Some("get_weather"));
        assert_eq!(folded.args_delta, Some(ToolCallArgs::json(r#"{"city":"#)));

        let folded = ToolCallPartDelta::default()
            .with_args_delta(r#""NYC"}"#)
            .fold(&folded)
            .unwrap();
        assert_eq!(folded.args_delta, Some(ToolCallArgs::json(r#"{"city":"NYC"}"#)));
        assert_eq!(folded.tool_name_delta.as_deref(), Some("get_weather"));
    }

    #[test]
    fn test_fold_args_conflict() {
        let pending = ToolCallPartDelta::default().with_args_delta(map(json!({"a": 1})));
        let delta = ToolCallPartDelta::default().with_args_delta("{");
        assert_eq!(
            delta.fold(&pending),
            Err(PartError::args_conflict(ArgsKind::Structured, ArgsKind::Json))
        );
    }

    #[test]
    fn test_as_part_requires_name_and_args() {
        assert!(ToolCallPartDelta::default().as_part().is_none());
        assert!(ToolCallPartDelta::default()
            .with_tool_name_delta("search")
            .as_part()
            .is_none());
        assert!(ToolCallPartDelta::default()
            .with_args_delta("{}")
            .as_part()
            .is_none());
        assert!(ToolCallPartDelta::default()
            .with_tool_name_delta("")
            .with_args_delta("{}")
            .as_part()
            .is_none());

        let part = ToolCallPartDelta::default()
            .with_tool_name_delta("search")
            .with_args_delta(Map::new())
            .with_tool_call_id("call_1")
            .as_part()
            .unwrap();
        assert_eq!(
            part,
            ToolCallPart::from_dict("search", Map::new(), Some("call_1".into()))
        );
    }

    #[test]
    fn test_delta_is_empty() {
        assert!(TextPartDelta::default().is_empty());
        assert!(!TextPartDelta::new("x").is_empty());
        assert!(ToolCallPartDelta::default().is_empty());
        assert!(!ToolCallPartDelta::default().with_tool_call_id("id").is_empty());
    }

    #[test]
    fn test_stream_event_helpers() {
        let start = ModelResponseStreamEvent::part_start(0, ModelResponsePart::text("Hello"));
        assert!(start.is_start());
        assert_eq!(start.index(), 0);

        let delta = ModelResponseStreamEvent::text_delta(0, " world");
        assert!(delta.is_delta());

        let end = ModelResponseStreamEvent::part_end(2, ModelResponsePart::text("Hello world"));
        assert!(end.is_end());
        assert_eq!(end.index(), 2);
    }

    #[test]
    fn test_event_tags() {
        let event = ModelResponseStreamEvent::text_delta(1, "lo");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({
                "event_kind": "part_delta",
                "index": 1,
                "delta": {"part_delta_kind": "text", "content_delta": "lo"}
            })
        );

        let event = ModelResponseStreamEvent::tool_call_delta(
            0,
            ToolCallPartDelta::default().with_args_delta(r#"{"a":"#),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["delta"]["part_delta_kind"], "tool_call");
        assert_eq!(json["delta"]["args_delta"], r#"{"a":"#);
        assert!(json["delta"].get("tool_name_delta").is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let event = ModelResponseStreamEvent::part_start(
            3,
            ModelResponsePart::ToolCall(ToolCallPart::from_dict(
                "search",
                map(json!({"q": "rust"})),
                Some("call_9".into()),
            )),
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ModelResponseStreamEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
