//! Submission handling and ownership of the single live stream.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::renderer::{RenderUpdate, StreamRenderer, StreamState};
use crate::core::topic::Topic;
use crate::core::topic_stream::{StreamMessage, StreamParams};
use crate::utils::url::build_stream_url;

/// The one open connection a session may hold.
#[derive(Debug)]
pub struct StreamHandle {
    id: u64,
    cancel_token: CancellationToken,
}

impl StreamHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    fn close(self) {
        self.cancel_token.cancel();
    }
}

pub struct StreamSession {
    base_url: String,
    current: Option<StreamHandle>,
    last_stream_id: u64,
    renderer: StreamRenderer,
}

impl StreamSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current: None,
            last_stream_id: 0,
            renderer: StreamRenderer::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn renderer(&self) -> &StreamRenderer {
        &self.renderer
    }

    pub fn state(&self) -> StreamState {
        self.renderer.state()
    }

    pub fn text(&self) -> &str {
        self.renderer.text()
    }

    pub fn current_stream_id(&self) -> Option<u64> {
        self.current.as_ref().map(StreamHandle::id)
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.current_stream_id() == Some(stream_id)
    }

    pub fn has_open_stream(&self) -> bool {
        self.current.is_some()
    }

    /// Accept a raw topic from the input field.
    ///
    /// Whitespace-only input is a no-op and returns `None`. Otherwise the
    /// display is cleared, any open stream is closed, and the parameters for
    /// the new stream are returned for the caller to spawn.
    pub fn submit(&mut self, raw_text: &str) -> Option<StreamParams> {
        let topic = Topic::parse(raw_text)?;

        self.renderer.clear();
        self.last_stream_id += 1;
        let handle = StreamHandle::new(self.last_stream_id);
        let url = build_stream_url(&self.base_url, &topic);
        let params = StreamParams {
            url,
            cancel_token: handle.cancel_token(),
            stream_id: handle.id(),
        };

        self.replace(handle);
        info!(stream_id = params.stream_id, url = %params.url, "submitted topic");
        Some(params)
    }

    /// Close the current handle, if any, and install `handle` in its place.
    ///
    /// Returns the final state of the handle that was closed.
    pub fn replace(&mut self, handle: StreamHandle) -> Option<StreamState> {
        let superseded = self.current.take().map(|previous| {
            debug!(stream_id = previous.id(), "closing superseded stream");
            previous.close();
            self.renderer.supersede().unwrap_or(self.renderer.state())
        });

        self.renderer.begin(handle.id());
        self.current = Some(handle);
        superseded
    }

    /// Close the current handle without starting a new one.
    pub fn cancel(&mut self) -> Option<StreamState> {
        let previous = self.current.take()?;
        previous.close();
        self.renderer.supersede()
    }

    /// Route a message from the stream service. Messages for any handle
    /// other than the current one are dropped.
    pub fn handle_message(&mut self, message: StreamMessage, stream_id: u64) -> RenderUpdate {
        if !self.is_current_stream(stream_id) {
            debug!(stream_id, current = ?self.current_stream_id(), "dropping stale message");
            return RenderUpdate::Ignored;
        }

        let update = self.renderer.apply(message);
        if update.is_terminal() {
            if let Some(handle) = self.current.take() {
                handle.close();
            }
        }
        update
    }
}
