//! # partstream
//!
//! Reconstruct structured model responses from streamed fragments.
//!
//! Language-model vendors stream a response as a flat sequence of small
//! fragments: pieces of text, pieces of tool-call names, pieces of tool-call
//! arguments, each tagged with the vendor's own identifier for the part it
//! belongs to. Fragments of different parts interleave freely. `partstream`
//! routes every fragment to a stable position, merges it into that position's
//! part and tells the consumer what changed.
//!
//! ## Quick Start
//!
//! ```rust
//! use partstream::prelude::*;
//!
//! let mut manager = ModelResponsePartsManager::new();
//!
//! manager.handle_text_delta("content", "The answer is ")?;
//! manager.handle_tool_call_delta(0, Some("calc"), None, None)?;
//! manager.handle_text_delta("content", "coming.")?;
//! manager.handle_tool_call_delta(0, None, Some(r#"{"expr":"6*7"}"#.into()), Some("call_1".into()))?;
//!
//! let response = ModelResponse::with_parts(manager.get_parts());
//! assert_eq!(response.text_content(), "The answer is coming.");
//! assert_eq!(response.tool_call_parts().count(), 1);
//! # Ok::<(), PartError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`partstream_core`] - Parts, deltas, merge operators, events and errors
//! - [`partstream_streaming`] - Parts manager and streamed-response adapter

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Core types, merge operators and error handling.
pub use partstream_core as core;

/// Parts manager and streaming support.
pub use partstream_streaming as streaming;

// ============================================================================
// Type Re-exports (Flat)
// ============================================================================

// Errors
pub use partstream_core::{ArgsKind, PartError, PartResult};
pub use partstream_streaming::{StreamError, StreamResult};

// Messages
pub use partstream_core::{
    ModelResponse, ModelResponsePart, ModelResponsePartDelta, ModelResponseStreamEvent,
    PartDeltaEvent, PartEndEvent, PartStartEvent, TextPart, TextPartDelta, ToolCallArgs,
    ToolCallPart, ToolCallPartDelta,
};

// Streaming
pub use partstream_streaming::{
    DeltaToolCall, FunctionStreamedResponse, ManagedPart, ModelResponsePartsManager, StreamChunk,
    StreamConfig, VendorId,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```rust
/// use partstream::prelude::*;
/// ```
pub mod prelude {
    // Errors
    pub use crate::core::{PartError, PartResult};
    pub use crate::streaming::{StreamError, StreamResult};

    // Messages
    pub use crate::core::{
        ModelResponse, ModelResponsePart, ModelResponseStreamEvent, TextPart, ToolCallArgs,
        ToolCallPart,
    };

    // Streaming
    pub use crate::streaming::{
        DeltaToolCall, FunctionStreamedResponse, ModelResponsePartsManager, StreamChunk,
        StreamConfig, VendorId,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of partstream.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{stream, StreamExt};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Weather {
        city: String,
        days: u32,
    }

    #[test]
    fn test_interleaved_vendor_stream() {
        let mut manager = ModelResponsePartsManager::new();
        let mut events = Vec::new();

        events.push(manager.handle_text_delta("msg", "Let me ").unwrap());
        events.extend(
            manager
                .handle_tool_call_delta("toolu_1", Some("get_weather"), None, Some("toolu_1".into()))
                .unwrap(),
        );
        events.push(manager.handle_text_delta("msg", "check.").unwrap());
        events.extend(
            manager
                .handle_tool_call_delta("toolu_1", None, Some(r#"{"city": "Oslo", "#.into()), None)
                .unwrap(),
        );
        events.extend(
            manager
                .handle_tool_call_delta("toolu_1", None, Some(r#""days": 3}"#.into()), None)
                .unwrap(),
        );

        let kinds: Vec<_> = events
            .iter()
            .map(|e| match e {
                ModelResponseStreamEvent::PartStart(s) => format!("start:{}", s.index),
                ModelResponseStreamEvent::PartDelta(d) => format!("delta:{}", d.index),
                ModelResponseStreamEvent::PartEnd(e) => format!("end:{}", e.index),
            })
            .collect();
        assert_eq!(kinds, vec!["start:0", "delta:0", "start:1", "delta:1"]);

        let response = ModelResponse::with_parts(manager.get_parts());
        assert_eq!(response.text_content(), "Let me check.");

        let call = response.tool_call_parts().next().unwrap();
        assert_eq!(call.tool_call_id.as_deref(), Some("toolu_1"));
        let weather: Weather = call.parse_args().unwrap();
        assert_eq!(
            weather,
            Weather {
                city: "Oslo".into(),
                days: 3
            }
        );
    }

    #[test]
    fn test_events_serialize_with_kind_tags() {
        let mut manager = ModelResponsePartsManager::new();
        let start = manager.handle_text_delta(VendorId::Anonymous, "Hi").unwrap();
        let delta = manager.handle_text_delta(VendorId::Anonymous, "!").unwrap();

        assert_eq!(
            serde_json::to_value(&start).unwrap(),
            json!({
                "event_kind": "part_start",
                "index": 0,
                "part": {"part_kind": "text", "content": "Hi"}
            })
        );
        assert_eq!(
            serde_json::to_value(&delta).unwrap(),
            json!({
                "event_kind": "part_delta",
                "index": 0,
                "delta": {"part_delta_kind": "text", "content_delta": "!"}
            })
        );
    }

    #[tokio::test]
    async fn test_function_stream_end_to_end() {
        let chunks = stream::iter(vec![
            Ok(StreamChunk::from("Searching")),
            Ok(StreamChunk::tool_call(
                0,
                DeltaToolCall::new()
                    .with_name("search")
                    .with_args(ToolCallArgs::structured(
                        json!({"q": "rust"}).as_object().cloned().unwrap_or_default(),
                    )),
            )),
            Ok(StreamChunk::from("...")),
        ]);

        let mut response = FunctionStreamedResponse::start(chunks)
            .await
            .unwrap()
            .with_config(StreamConfig::new().with_part_end_events(true));

        let mut count = 0;
        while let Some(event) = response.next().await {
            event.unwrap();
            count += 1;
        }
        // start, start, delta, end, end
        assert_eq!(count, 5);

        let snapshot = response.get();
        assert_eq!(snapshot.text_content(), "Searching...");
        assert_eq!(
            snapshot.tool_call_parts().next().map(|c| c.args_as_json_str()),
            Some(r#"{"q":"rust"}"#.to_string())
        );
    }
}
