//! Streaming errors.

use partstream_core::PartError;
use thiserror::Error;

/// Errors that can occur during streaming.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A fragment could not be merged into the response.
    #[error("Invalid fragment: {0}")]
    Part(#[from] PartError),

    /// The upstream source finished without yielding anything.
    #[error("Stream function must return at least one item")]
    EmptyStream,

    /// The upstream source failed.
    #[error("Stream source error: {0}")]
    Source(String),
}

impl StreamError {
    /// Check if the error was caused by a single rejected fragment.
    ///
    /// Such errors leave the parts manager untouched, so a caller may skip
    /// the fragment and keep going.
    #[must_use]
    pub fn is_fragment_error(&self) -> bool {
        matches!(self, Self::Part(_))
    }

    /// Create from any upstream error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Source(err.to_string())
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::EmptyStream;
        assert_eq!(err.to_string(), "Stream function must return at least one item");

        let err: StreamError = PartError::type_mismatch("text", "tool-call").into();
        assert_eq!(
            err.to_string(),
            "Invalid fragment: Cannot apply a tool-call fragment to a text part"
        );
    }

    #[test]
    fn test_fragment_error() {
        let err: StreamError = PartError::MalformedArguments("eof".into()).into();
        assert!(err.is_fragment_error());
        assert!(!StreamError::EmptyStream.is_fragment_error());
        assert!(!StreamError::from_err("connection reset").is_fragment_error());
    }
}
