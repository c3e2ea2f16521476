//! Connection layer between the stream service and the network.
//!
//! [`StreamTransport`] opens one event-stream connection and hands back its
//! body as a stream of byte chunks. Dropping that stream releases the
//! connection.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

use crate::api::{UpstreamErrorBody, EVENT_STREAM_MIME};

const MAX_ERROR_SUMMARY_CHARS: usize = 200;

pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

#[derive(Debug)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    Request(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status { status: u16, detail: String },
    /// The endpoint answered with something other than an event stream.
    UnexpectedContentType(String),
    /// The body ended before the completion sentinel arrived.
    ClosedBeforeDone,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "request failed: {err}"),
            TransportError::Status { status, detail } if detail.is_empty() => {
                write!(f, "upstream returned HTTP {status}")
            }
            TransportError::Status { status, detail } => {
                write!(f, "upstream returned HTTP {status}: {detail}")
            }
            TransportError::UnexpectedContentType(content_type) => {
                write!(f, "expected {EVENT_STREAM_MIME}, got '{content_type}'")
            }
            TransportError::ClosedBeforeDone => {
                write!(f, "connection closed before completion")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err)
    }
}

#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<ChunkStream, TransportError>;
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn connect(&self, url: &str) -> Result<ChunkStream, TransportError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: summarize_error_body(&body),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_event_stream(&content_type) {
            return Err(TransportError::UnexpectedContentType(content_type));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(TransportError::from))
            .boxed())
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM_MIME))
        .unwrap_or(false)
}

/// Reduce an upstream error body to a single short line.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    let summary = serde_json::from_str::<UpstreamErrorBody>(trimmed)
        .map(|parsed| parsed.summary().to_string())
        .unwrap_or_else(|_| trimmed.to_string());

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_SUMMARY_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_ERROR_SUMMARY_CHARS).collect();
        truncated.push('…');
        truncated
    } else {
        collapsed
    }
}
