//! Function-driven streamed responses.
//!
//! [`FunctionStreamedResponse`] turns a stream of plain [`StreamChunk`]s, as
//! produced by a local function standing in for a model, into a stream of
//! part events backed by a [`ModelResponsePartsManager`].

use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use partstream_core::messages::{ModelResponse, ModelResponseStreamEvent, ToolCallArgs};
use partstream_core::PartResult;
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use crate::parts_manager::ModelResponsePartsManager;

/// Incremental change to a single tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaToolCall {
    /// Fragment of the tool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fragment of the arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ToolCallArgs>,
    /// Tool call ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl DeltaToolCall {
    /// Create an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name fragment.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the arguments fragment.
    #[must_use]
    pub fn with_args(mut self, args: impl Into<ToolCallArgs>) -> Self {
        self.args = Some(args.into());
        self
    }

    /// Set the tool call ID.
    #[must_use]
    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }
}

/// A chunk yielded by a stream function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamChunk {
    /// Plain text.
    Text(String),
    /// Tool call deltas keyed by tool call index.
    ToolCalls(#[serde(deserialize_with = "deserialize_tool_calls")] BTreeMap<u32, DeltaToolCall>),
}

/// Tool call index as it appears in a map key. Buffered formats hand JSON
/// object keys over as strings, binary formats as integers.
#[derive(PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
enum ToolCallIndex {
    Int(u32),
    Str(String),
}

fn deserialize_tool_calls<'de, D>(deserializer: D) -> Result<BTreeMap<u32, DeltaToolCall>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    BTreeMap::<ToolCallIndex, DeltaToolCall>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, delta)| match key {
            ToolCallIndex::Int(index) => Ok((index, delta)),
            ToolCallIndex::Str(key) => key
                .parse::<u32>()
                .map(|index| (index, delta))
                .map_err(|e| D::Error::custom(format!("invalid tool call index {key:?}: {e}"))),
        })
        .collect()
}

impl StreamChunk {
    /// Create a chunk holding a single tool call delta.
    #[must_use]
    pub fn tool_call(index: u32, delta: DeltaToolCall) -> Self {
        Self::ToolCalls(BTreeMap::from([(index, delta)]))
    }
}

impl From<String> for StreamChunk {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for StreamChunk {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<BTreeMap<u32, DeltaToolCall>> for StreamChunk {
    fn from(calls: BTreeMap<u32, DeltaToolCall>) -> Self {
        Self::ToolCalls(calls)
    }
}

pin_project! {
    /// Streamed response driven by a stream of [`StreamChunk`]s.
    ///
    /// Text chunks are routed under [`StreamConfig::text_vendor_id`]; each
    /// tool call delta is routed under its integer key, in ascending key
    /// order. Every event the parts manager reports is yielded in order.
    ///
    /// The response can be read with [`get`](Self::get) at any time,
    /// including after the consumer stops polling early.
    pub struct FunctionStreamedResponse<S> {
        #[pin]
        inner: S,
        config: StreamConfig,
        parts_manager: ModelResponsePartsManager,
        pending_events: VecDeque<StreamResult<ModelResponseStreamEvent>>,
        peeked: Option<StreamResult<StreamChunk>>,
        model_name: Option<String>,
        timestamp: DateTime<Utc>,
        finished: bool,
    }
}

impl<S> FunctionStreamedResponse<S>
where
    S: Stream<Item = StreamResult<StreamChunk>>,
{
    /// Create a new streamed response without inspecting the source.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            config: StreamConfig::default(),
            parts_manager: ModelResponsePartsManager::new(),
            pending_events: VecDeque::new(),
            peeked: None,
            model_name: None,
            timestamp: Utc::now(),
            finished: false,
        }
    }

    /// Create a streamed response, waiting for the source's first chunk.
    ///
    /// The first chunk is held back and processed on the first poll.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::EmptyStream`] if the source ends without
    /// yielding anything.
    pub async fn start(mut inner: S) -> StreamResult<Self>
    where
        S: Unpin,
    {
        let first = inner.next().await.ok_or(StreamError::EmptyStream)?;
        let mut response = Self::new(inner);
        response.peeked = Some(first);
        Ok(response)
    }

    /// Set the stream configuration.
    #[must_use]
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the model name reported by [`get`](Self::get).
    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Get the stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Get the parts manager.
    pub fn parts_manager(&self) -> &ModelResponsePartsManager {
        &self.parts_manager
    }

    /// Get the time the response was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Check whether the source is exhausted or has failed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Build a response from the parts received so far.
    pub fn get(&self) -> ModelResponse {
        let response = ModelResponse::with_parts(self.parts_manager.get_parts())
            .with_timestamp(self.timestamp);
        match &self.model_name {
            Some(name) => response.with_model_name(name.clone()),
            None => response,
        }
    }
}

impl<S> Stream for FunctionStreamedResponse<S>
where
    S: Stream<Item = StreamResult<StreamChunk>>,
{
    type Item = StreamResult<ModelResponseStreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.pending_events.pop_front() {
                return Poll::Ready(Some(event));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            let chunk = match this.peeked.take() {
                Some(chunk) => chunk,
                None => match this.inner.as_mut().poll_next(cx) {
                    Poll::Ready(Some(chunk)) => chunk,
                    Poll::Ready(None) => {
                        *this.finished = true;
                        if this.config.emit_part_end_events {
                            this.pending_events
                                .extend(this.parts_manager.part_end_events().into_iter().map(Ok));
                        }
                        continue;
                    }
                    Poll::Pending => return Poll::Pending,
                },
            };

            match chunk {
                Ok(chunk) => {
                    let keep_going = handle_chunk(
                        this.parts_manager,
                        this.config,
                        this.pending_events,
                        chunk,
                    );
                    if !keep_going {
                        *this.finished = true;
                    }
                }
                Err(e) => {
                    *this.finished = true;
                    this.pending_events.push_back(Err(e));
                }
            }
        }
    }
}

/// Feed one chunk to the parts manager, queueing the resulting events.
///
/// Returns `false` once an error has been queued and the stream must stop.
fn handle_chunk(
    parts_manager: &mut ModelResponsePartsManager,
    config: &StreamConfig,
    pending_events: &mut VecDeque<StreamResult<ModelResponseStreamEvent>>,
    chunk: StreamChunk,
) -> bool {
    match chunk {
        StreamChunk::Text(content) => {
            let result = parts_manager
                .handle_text_delta(config.text_vendor_id.as_str(), &content)
                .map(Some);
            queue_result(config, pending_events, result)
        }
        StreamChunk::ToolCalls(calls) => {
            for (index, call) in calls {
                let result = parts_manager.handle_tool_call_delta(
                    index,
                    call.name.as_deref(),
                    call.args,
                    call.tool_call_id,
                );
                if !queue_result(config, pending_events, result) {
                    return false;
                }
            }
            true
        }
    }
}

fn queue_result(
    config: &StreamConfig,
    pending_events: &mut VecDeque<StreamResult<ModelResponseStreamEvent>>,
    result: PartResult<Option<ModelResponseStreamEvent>>,
) -> bool {
    match result {
        Ok(Some(event)) => {
            pending_events.push_back(Ok(event));
            true
        }
        Ok(None) => true,
        Err(err) if config.skip_invalid_fragments => {
            warn!(error = %err, "Skipping invalid fragment");
            true
        }
        Err(err) => {
            pending_events.push_back(Err(err.into()));
            false
        }
    }
}
