//! Message types for model responses.
//!
//! - **Parts**: [`TextPart`], [`ToolCallPart`] and [`ToolCallArgs`]
//! - **Responses**: [`ModelResponse`] and [`ModelResponsePart`]
//! - **Streaming**: [`ModelResponseStreamEvent`] and the delta types with
//!   their merge operators
//!
//! ## Example
//!
//! ```rust
//! use partstream_core::messages::{ToolCallPart, ToolCallPartDelta};
//!
//! let part = ToolCallPart::from_json("get_weather", r#"{"city":"#, None);
//! let delta = ToolCallPartDelta::default().with_args_delta(r#""Paris"}"#);
//!
//! let updated = delta.apply(&part).unwrap();
//! assert_eq!(updated.args_as_json_str(), r#"{"city":"Paris"}"#);
//! ```

pub mod events;
pub mod parts;
pub mod response;

// Re-exports for convenience
pub use events::{
    ModelResponsePartDelta, ModelResponseStreamEvent, PartDeltaEvent, PartEndEvent,
    PartStartEvent, TextPartDelta, ToolCallPartDelta,
};
pub use parts::{TextPart, ToolCallArgs, ToolCallPart};
pub use response::{ModelResponse, ModelResponsePart};
