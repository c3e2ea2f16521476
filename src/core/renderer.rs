//! Receive-side state machine for one stream handle.

use std::fmt;

use tracing::{debug, info, warn};

use crate::api::CONNECTION_LOST_NOTICE;
use crate::core::display::DisplayBuffer;
use crate::core::topic_stream::StreamMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No submission has been made yet.
    Idle,
    Open,
    Receiving,
    Completed,
    Failed,
    Superseded,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StreamState::Completed | StreamState::Failed | StreamState::Superseded
        )
    }

    pub fn is_live(self) -> bool {
        matches!(self, StreamState::Open | StreamState::Receiving)
    }

    pub fn label(self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Open => "connecting",
            StreamState::Receiving => "streaming",
            StreamState::Completed => "done",
            StreamState::Failed => "connection lost",
            StreamState::Superseded => "superseded",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a message did to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderUpdate {
    /// Text was appended; the view should follow the newest content.
    Appended,
    Completed,
    Failed,
    /// The message was stale or arrived after a terminal state.
    Ignored,
}

impl RenderUpdate {
    pub fn is_terminal(self) -> bool {
        matches!(self, RenderUpdate::Completed | RenderUpdate::Failed)
    }
}

#[derive(Debug)]
pub struct StreamRenderer {
    state: StreamState,
    stream_id: Option<u64>,
    buffer: DisplayBuffer,
    failure: Option<String>,
}

impl Default for StreamRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRenderer {
    pub fn new() -> Self {
        Self {
            state: StreamState::Idle,
            stream_id: None,
            buffer: DisplayBuffer::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stream_id(&self) -> Option<u64> {
        self.stream_id
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Reason recorded for the last transport failure.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Mark a live stream as replaced. Returns the resulting state when a
    /// transition happened.
    pub fn supersede(&mut self) -> Option<StreamState> {
        if !self.state.is_live() {
            return None;
        }
        debug!(stream_id = ?self.stream_id, "stream superseded");
        self.state = StreamState::Superseded;
        Some(self.state)
    }

    /// Start rendering a freshly opened handle.
    pub fn begin(&mut self, stream_id: u64) {
        self.stream_id = Some(stream_id);
        self.state = StreamState::Open;
        self.failure = None;
    }

    pub fn apply(&mut self, message: StreamMessage) -> RenderUpdate {
        if !self.state.is_live() {
            debug!(
                stream_id = ?self.stream_id,
                state = %self.state,
                "dropping message after terminal state"
            );
            return RenderUpdate::Ignored;
        }

        match message {
            StreamMessage::Chunk(fragment) => {
                self.buffer.append(&fragment);
                self.state = StreamState::Receiving;
                RenderUpdate::Appended
            }
            StreamMessage::Done => {
                info!(
                    stream_id = ?self.stream_id,
                    fragments = self.buffer.fragments().len(),
                    "stream completed"
                );
                self.state = StreamState::Completed;
                RenderUpdate::Completed
            }
            StreamMessage::Failed(reason) => {
                warn!(stream_id = ?self.stream_id, %reason, "stream failed");
                self.buffer.append(CONNECTION_LOST_NOTICE);
                self.failure = Some(reason);
                self.state = StreamState::Failed;
                RenderUpdate::Failed
            }
        }
    }
}
