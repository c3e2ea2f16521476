//! Wire-level constants and payload shapes for the `/stream` endpoint.

use serde::Deserialize;

/// Path of the streaming endpoint, relative to the configured base URL.
pub const STREAM_ENDPOINT: &str = "stream";

/// Name of the single query parameter carrying the topic.
pub const TOPIC_PARAM: &str = "topic";

/// In-band payload that marks graceful completion of a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Fragment appended to the output when the connection fails mid-stream.
pub const CONNECTION_LOST_NOTICE: &str = "\n\n[Connection lost]";

/// Media type the endpoint must answer with.
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Event type assigned to events that carry no `event:` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Error body shapes an upstream may answer with instead of a stream.
///
/// Only used for diagnostics; anything that does not match is reported as
/// plain text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamErrorBody {
    Nested { error: UpstreamErrorDetail },
    Flat { error: String },
    Message { message: String },
}

#[derive(Debug, Deserialize)]
pub struct UpstreamErrorDetail {
    pub message: String,
}

impl UpstreamErrorBody {
    pub fn summary(&self) -> &str {
        match self {
            UpstreamErrorBody::Nested { error } => &error.message,
            UpstreamErrorBody::Flat { error } => error,
            UpstreamErrorBody::Message { message } => message,
        }
    }
}
