//! Parts manager for streaming responses.
//!
//! Routes streamed fragments to stable part positions by vendor-assigned ID,
//! merges them into materialized parts and reports what changed as stream
//! events.

use std::fmt;

use indexmap::IndexMap;
use partstream_core::messages::{
    ModelResponsePart, ModelResponsePartDelta, ModelResponseStreamEvent, TextPart, TextPartDelta,
    ToolCallArgs, ToolCallPart, ToolCallPartDelta,
};
use partstream_core::{PartError, PartResult};
use tracing::{debug, trace};

/// Vendor-assigned part identifier.
///
/// Different vendors use different types for part IDs - some use strings
/// (e.g., "msg_123"), while others use integers (e.g., OpenAI's tool call
/// indices). Streams with a single part may not send one at all, which maps to
/// [`VendorId::Anonymous`]. Keys of different kinds never compare equal, so
/// `Index(0)` and `Named("0")` address different parts.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum VendorId {
    /// String-based identifier.
    Named(String),
    /// Integer-based identifier.
    Index(i64),
    /// No identifier: the single implicit slot.
    Anonymous,
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name:?}"),
            Self::Index(i) => write!(f, "#{i}"),
            Self::Anonymous => f.write_str("<anonymous>"),
        }
    }
}

impl From<String> for VendorId {
    fn from(s: String) -> Self {
        Self::Named(s)
    }
}

impl From<&str> for VendorId {
    fn from(s: &str) -> Self {
        Self::Named(s.to_string())
    }
}

impl From<i64> for VendorId {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for VendorId {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<u32> for VendorId {
    fn from(i: u32) -> Self {
        Self::Index(i64::from(i))
    }
}

/// Indices above `i64::MAX` saturate rather than wrap to negative values.
impl From<usize> for VendorId {
    fn from(i: usize) -> Self {
        Self::Index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl<T: Into<VendorId>> From<Option<T>> for VendorId {
    fn from(id: Option<T>) -> Self {
        id.map_or(Self::Anonymous, Into::into)
    }
}

/// A managed part - either materialized or still pending.
///
/// Text parts are materialized on their first fragment. Tool calls stay
/// pending until their accumulated delta has both a name and arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedPart {
    /// Materialized part, visible to consumers.
    Complete(ModelResponsePart),
    /// Tool call still missing its name or arguments.
    Pending(ToolCallPartDelta),
}

impl ManagedPart {
    /// Check if this slot is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Get the materialized part, if any.
    #[must_use]
    pub fn as_part(&self) -> Option<&ModelResponsePart> {
        match self {
            Self::Complete(part) => Some(part),
            Self::Pending(_) => None,
        }
    }

    /// Kind of part this slot holds (pending slots are always tool calls).
    #[must_use]
    pub fn part_kind(&self) -> &'static str {
        match self {
            Self::Complete(part) => part.part_kind(),
            Self::Pending(_) => ToolCallPart::PART_KIND,
        }
    }
}

/// Manages streaming response parts with vendor ID tracking.
///
/// Every distinct vendor ID is bound to the next free position the first time
/// it is seen, and keeps that position for the rest of the stream, however
/// its fragments interleave with others. Positions are never reused and parts
/// are never removed.
///
/// Each fragment produces at most one event:
///
/// - a `PartStart` the first time a position holds a materialized part;
/// - a `PartDelta` carrying the fragment for every later update;
/// - nothing while a tool call is still pending.
///
/// A fragment that fails to merge returns an error and leaves every slot as
/// it was, so the caller may skip it and continue.
///
/// # Example
///
/// ```rust
/// use partstream_streaming::parts_manager::ModelResponsePartsManager;
///
/// let mut manager = ModelResponsePartsManager::new();
///
/// let start = manager.handle_text_delta("content", "Hel").unwrap();
/// assert!(start.is_start());
/// let delta = manager.handle_text_delta("content", "lo").unwrap();
/// assert!(delta.is_delta());
///
/// // Name and arguments arrive separately: no event until both are known.
/// let pending = manager.handle_tool_call_delta(0, Some("search"), None, None).unwrap();
/// assert!(pending.is_none());
/// let started = manager
///     .handle_tool_call_delta(0, None, Some(r#"{"q":"rust"}"#.into()), None)
///     .unwrap();
/// assert_eq!(started.map(|e| e.index()), Some(1));
///
/// assert_eq!(manager.get_parts().len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ModelResponsePartsManager {
    /// The managed parts, indexed by position.
    parts: Vec<ManagedPart>,
    /// Map from vendor ID to position, in order of first appearance.
    vendor_id_to_index: IndexMap<VendorId, usize>,
}

impl ModelResponsePartsManager {
    /// Create a new parts manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of allocated positions, pending ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if no position has been allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Get a reference to the internal slots.
    #[must_use]
    pub fn parts(&self) -> &[ManagedPart] {
        &self.parts
    }

    /// Get the position bound to a vendor ID.
    #[must_use]
    pub fn index_of(&self, vendor_part_id: &VendorId) -> Option<usize> {
        self.vendor_id_to_index.get(vendor_part_id).copied()
    }

    /// Iterate over the known vendor IDs in position order.
    pub fn vendor_ids(&self) -> impl Iterator<Item = &VendorId> {
        self.vendor_id_to_index.keys()
    }

    /// Number of positions still holding a pending tool call.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_pending()).count()
    }

    /// Get the materialized parts in position order.
    ///
    /// Pending tool calls are omitted; the remaining parts keep their relative
    /// order. Safe to call at any point of the stream.
    #[must_use]
    pub fn get_parts(&self) -> Vec<ModelResponsePart> {
        self.parts
            .iter()
            .filter_map(ManagedPart::as_part)
            .cloned()
            .collect()
    }

    /// Build one `PartEnd` event per materialized part, in position order.
    #[must_use]
    pub fn part_end_events(&self) -> Vec<ModelResponseStreamEvent> {
        self.parts
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_part()
                    .map(|part| ModelResponseStreamEvent::part_end(index, part.clone()))
            })
            .collect()
    }

    /// Handle a text fragment.
    ///
    /// An unseen vendor ID starts a new text part holding `content`; a known
    /// one appends `content` to its text part.
    ///
    /// # Errors
    ///
    /// Returns [`PartError::TypeMismatch`] if the vendor ID is bound to a tool
    /// call.
    pub fn handle_text_delta(
        &mut self,
        vendor_part_id: impl Into<VendorId>,
        content: &str,
    ) -> PartResult<ModelResponseStreamEvent> {
        let vendor_part_id = vendor_part_id.into();

        let Some(index) = self.index_of(&vendor_part_id) else {
            let part = ModelResponsePart::Text(TextPart::new(content));
            let index = self.allocate(vendor_part_id, ManagedPart::Complete(part.clone()));
            return Ok(ModelResponseStreamEvent::part_start(index, part));
        };

        let delta = TextPartDelta::new(content);
        let updated = match &self.parts[index] {
            ManagedPart::Complete(ModelResponsePart::Text(text)) => delta.apply(text),
            slot => {
                let err = PartError::type_mismatch(slot.part_kind(), TextPart::PART_KIND);
                return Err(reject(index, &vendor_part_id, err));
            }
        };

        self.parts[index] = ManagedPart::Complete(ModelResponsePart::Text(updated));
        trace!(index, vendor_part_id = %vendor_part_id, len = content.len(), "text delta");
        Ok(ModelResponseStreamEvent::part_delta(
            index,
            ModelResponsePartDelta::Text(delta),
        ))
    }

    /// Handle a tool call fragment.
    ///
    /// The three optional inputs form a [`ToolCallPartDelta`]. Until the
    /// accumulated delta for a vendor ID has both a name and arguments it is
    /// kept pending and no event is returned; the fragment that completes it
    /// returns a `PartStart`, and later fragments return `PartDelta`s.
    ///
    /// # Errors
    ///
    /// - [`PartError::TypeMismatch`] if the vendor ID is bound to a text part.
    /// - [`PartError::ArgsRepresentationConflict`] if `args` uses a different
    ///   representation than the arguments accumulated so far.
    /// - [`PartError::CallIdConflict`] if `tool_call_id` differs from the one
    ///   already fixed.
    pub fn handle_tool_call_delta(
        &mut self,
        vendor_part_id: impl Into<VendorId>,
        tool_name: Option<&str>,
        args: Option<ToolCallArgs>,
        tool_call_id: Option<String>,
    ) -> PartResult<Option<ModelResponseStreamEvent>> {
        let vendor_part_id = vendor_part_id.into();
        let delta = ToolCallPartDelta::new(tool_name.map(str::to_string), args, tool_call_id);

        let Some(index) = self.index_of(&vendor_part_id) else {
            return Ok(match delta.as_part() {
                Some(call) => {
                    let part = ModelResponsePart::ToolCall(call);
                    let index = self.allocate(vendor_part_id, ManagedPart::Complete(part.clone()));
                    Some(ModelResponseStreamEvent::part_start(index, part))
                }
                None => {
                    self.allocate(vendor_part_id, ManagedPart::Pending(delta));
                    None
                }
            });
        };

        match &self.parts[index] {
            ManagedPart::Pending(pending) => {
                let folded = delta
                    .fold(pending)
                    .map_err(|err| reject(index, &vendor_part_id, err))?;

                match folded.as_part() {
                    Some(call) => {
                        let part = ModelResponsePart::ToolCall(call);
                        self.parts[index] = ManagedPart::Complete(part.clone());
                        trace!(index, vendor_part_id = %vendor_part_id, "tool call materialized");
                        Ok(Some(ModelResponseStreamEvent::part_start(index, part)))
                    }
                    None => {
                        self.parts[index] = ManagedPart::Pending(folded);
                        Ok(None)
                    }
                }
            }
            ManagedPart::Complete(ModelResponsePart::ToolCall(call)) => {
                let updated = delta
                    .apply(call)
                    .map_err(|err| reject(index, &vendor_part_id, err))?;

                self.parts[index] = ManagedPart::Complete(ModelResponsePart::ToolCall(updated));
                trace!(index, vendor_part_id = %vendor_part_id, "tool call delta");
                Ok(Some(ModelResponseStreamEvent::tool_call_delta(index, delta)))
            }
            ManagedPart::Complete(ModelResponsePart::Text(_)) => {
                let err = PartError::type_mismatch(TextPart::PART_KIND, ToolCallPart::PART_KIND);
                Err(reject(index, &vendor_part_id, err))
            }
        }
    }

    /// Bind a new vendor ID to the next position.
    fn allocate(&mut self, vendor_part_id: VendorId, slot: ManagedPart) -> usize {
        let index = self.parts.len();
        trace!(
            index,
            vendor_part_id = %vendor_part_id,
            pending = slot.is_pending(),
            "new part position"
        );
        self.parts.push(slot);
        self.vendor_id_to_index.insert(vendor_part_id, index);
        index
    }
}

fn reject(index: usize, vendor_part_id: &VendorId, err: PartError) -> PartError {
    debug!(index, vendor_part_id = %vendor_part_id, error = %err, "rejected fragment");
    err
}
