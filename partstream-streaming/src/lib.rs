//! # partstream-streaming
//!
//! Streaming reconstruction of model responses.
//!
//! Vendors stream a response as fragments tagged with their own part
//! identifiers. This crate routes those fragments to stable positions and
//! merges them into materialized parts, reporting each change as an event.
//!
//! ## Core Concepts
//!
//! - **[`ModelResponsePartsManager`]**: Route and merge fragments by vendor ID
//! - **[`VendorId`]**: Named, indexed or anonymous vendor part identifiers
//! - **[`FunctionStreamedResponse`]**: Drive the manager from a stream of chunks
//! - **[`StreamConfig`]**: Tunables for the streamed response
//!
//! ## Example
//!
//! ```rust
//! use futures::{stream, StreamExt};
//! use partstream_streaming::{DeltaToolCall, FunctionStreamedResponse, StreamChunk};
//!
//! # futures::executor::block_on(async {
//! let chunks = stream::iter(vec![
//!     Ok(StreamChunk::from("Checking the weather")),
//!     Ok(StreamChunk::tool_call(0, DeltaToolCall::new().with_name("get_weather"))),
//!     Ok(StreamChunk::tool_call(0, DeltaToolCall::new().with_args(r#"{"city":"Paris"}"#))),
//! ]);
//!
//! let mut response = FunctionStreamedResponse::start(chunks).await.unwrap();
//! while let Some(event) = response.next().await {
//!     println!("{:?}", event.unwrap());
//! }
//!
//! assert_eq!(response.get().parts.len(), 2);
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod function;
pub mod parts_manager;

// Re-exports
pub use config::StreamConfig;
pub use error::{StreamError, StreamResult};
pub use function::{DeltaToolCall, FunctionStreamedResponse, StreamChunk};
pub use parts_manager::{ManagedPart, ModelResponsePartsManager, VendorId};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        DeltaToolCall, FunctionStreamedResponse, ModelResponsePartsManager, StreamChunk,
        StreamConfig, StreamError, StreamResult, VendorId,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let manager = ModelResponsePartsManager::new();
        assert!(manager.is_empty());
        let config = StreamConfig::default();
        assert!(!config.emit_part_end_events);
        assert_eq!(VendorId::from(None::<i64>), VendorId::Anonymous);
    }
}
