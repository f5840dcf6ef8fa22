//! # partstream-core
//!
//! Core types for reconstructing model responses from streamed fragments.
//!
//! - **Parts**: the materialized pieces of a response (text and tool calls)
//! - **Deltas**: incremental updates to a part, with their merge operators
//! - **Events**: the notifications a consumer receives while a stream runs
//! - **Errors**: the conflicts a merge can run into
//!
//! ## Example
//!
//! ```rust
//! use partstream_core::{ModelResponsePart, ModelResponsePartDelta, TextPartDelta};
//!
//! let part = ModelResponsePart::text("Hel");
//! let delta = ModelResponsePartDelta::Text(TextPartDelta::new("lo"));
//!
//! assert_eq!(delta.apply(&part).unwrap(), ModelResponsePart::text("Hello"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod errors;
pub mod messages;

// Re-exports for convenience
pub use errors::{ArgsKind, PartError, PartResult};
pub use messages::{
    ModelResponse, ModelResponsePart, ModelResponsePartDelta, ModelResponseStreamEvent,
    PartDeltaEvent, PartEndEvent, PartStartEvent, TextPart, TextPartDelta, ToolCallArgs,
    ToolCallPart, ToolCallPartDelta,
};

/// Prelude module for common imports.
///
/// ```rust
/// use partstream_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{ArgsKind, PartError, PartResult};
    pub use crate::messages::{
        ModelResponse, ModelResponsePart, ModelResponsePartDelta, ModelResponseStreamEvent,
        TextPart, TextPartDelta, ToolCallArgs, ToolCallPart, ToolCallPartDelta,
    };
}
