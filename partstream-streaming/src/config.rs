//! Configuration for streamed responses.

use serde::{Deserialize, Serialize};

/// Default vendor ID for plain-text chunks.
pub const DEFAULT_TEXT_VENDOR_ID: &str = "content";

/// Configuration for [`FunctionStreamedResponse`](crate::FunctionStreamedResponse).
///
/// Every field has a default, so partial documents deserialize:
///
/// ```rust
/// use partstream_streaming::StreamConfig;
///
/// let config: StreamConfig = serde_json::from_str(r#"{"emit_part_end_events": true}"#).unwrap();
/// assert!(config.emit_part_end_events);
/// assert_eq!(config.text_vendor_id, "content");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Vendor ID used to route plain-text chunks.
    pub text_vendor_id: String,
    /// Emit a `PartEnd` per materialized part once the source is exhausted.
    pub emit_part_end_events: bool,
    /// Log and skip fragments that fail to merge instead of ending the stream.
    pub skip_invalid_fragments: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            text_vendor_id: DEFAULT_TEXT_VENDOR_ID.to_string(),
            emit_part_end_events: false,
            skip_invalid_fragments: false,
        }
    }
}

impl StreamConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vendor ID for text chunks.
    #[must_use]
    pub fn with_text_vendor_id(mut self, id: impl Into<String>) -> Self {
        self.text_vendor_id = id.into();
        self
    }

    /// Set whether to emit part end events.
    #[must_use]
    pub fn with_part_end_events(mut self, emit: bool) -> Self {
        self.emit_part_end_events = emit;
        self
    }

    /// Set whether to skip invalid fragments.
    #[must_use]
    pub fn with_skip_invalid_fragments(mut self, skip: bool) -> Self {
        self.skip_invalid_fragments = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.text_vendor_id, "content");
        assert!(!config.emit_part_end_events);
        assert!(!config.skip_invalid_fragments);
    }

    #[test]
    fn test_builder() {
        let config = StreamConfig::new()
            .with_text_vendor_id("text")
            .with_part_end_events(true)
            .with_skip_invalid_fragments(true);
        assert_eq!(config.text_vendor_id, "text");
        assert!(config.emit_part_end_events);
        assert!(config.skip_invalid_fragments);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let config: StreamConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StreamConfig::default());
    }
}
