use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::DONE_SENTINEL;
use crate::core::sse::SseDecoder;
use crate::core::transport::{HttpTransport, StreamTransport, TransportError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Done,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct StreamParams {
    pub url: String,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

pub type StreamReceiver = mpsc::UnboundedReceiver<(StreamMessage, u64)>;

#[derive(Clone)]
pub struct TopicStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
    transport: Arc<dyn StreamTransport>,
}

impl TopicStreamService {
    pub fn new(client: reqwest::Client) -> (Self, StreamReceiver) {
        Self::with_transport(Arc::new(HttpTransport::new(client)))
    }

    pub fn with_transport(transport: Arc<dyn StreamTransport>) -> (Self, StreamReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, transport }, rx)
    }

    /// Run one stream on its own task until it completes, fails, or its
    /// token is cancelled. Cancellation drops the response body without
    /// sending anything further.
    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let StreamParams {
                url,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                outcome = pump_stream(transport.as_ref(), &url, &tx, stream_id) => {
                    if let Err(err) = outcome {
                        warn!(stream_id, %url, error = %err, "stream transport failed");
                        let _ = tx.send((StreamMessage::Failed(err.to_string()), stream_id));
                    }
                }
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "stream cancelled");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn pump_stream(
    transport: &dyn StreamTransport,
    url: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> Result<(), TransportError> {
    debug!(stream_id, %url, "opening stream");
    let mut body = transport.connect(url).await?;
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        for event in decoder.feed(&chunk?) {
            if !event.is_message() {
                debug!(stream_id, event_type = %event.event_type, "skipping named event");
                continue;
            }
            if event.data == DONE_SENTINEL {
                let _ = tx.send((StreamMessage::Done, stream_id));
                return Ok(());
            }
            let _ = tx.send((StreamMessage::Chunk(event.data), stream_id));
        }
    }

    Err(TransportError::ClosedBeforeDone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{Script, ScriptStep, ScriptedTransport};

    async fn collect_until_terminal(rx: &mut StreamReceiver) -> Vec<(StreamMessage, u64)> {
        let mut messages = Vec::new();
        while let Some((message, stream_id)) = rx.recv().await {
            let terminal = matches!(message, StreamMessage::Done | StreamMessage::Failed(_));
            messages.push((message, stream_id));
            if terminal {
                break;
            }
        }
        messages
    }

    fn params(stream_id: u64) -> StreamParams {
        StreamParams {
            url: format!("http://test/stream?topic=t{stream_id}"),
            cancel_token: CancellationToken::new(),
            stream_id,
        }
    }

    #[tokio::test]
    async fn chunks_are_forwarded_in_order_then_done() {
        let transport = ScriptedTransport::new([Script::Body(vec![
            ScriptStep::event("A"),
            ScriptStep::Bytes(b"data: B\n\ndata: ".to_vec()),
            ScriptStep::Bytes(b"C\n\n".to_vec()),
            ScriptStep::event("[DONE]"),
            ScriptStep::event("after done"),
        ])]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport.clone()));

        service.spawn_stream(params(3));
        let messages = collect_until_terminal(&mut rx).await;

        assert_eq!(
            messages,
            vec![
                (StreamMessage::Chunk("A".into()), 3),
                (StreamMessage::Chunk("B".into()), 3),
                (StreamMessage::Chunk("C".into()), 3),
                (StreamMessage::Done, 3),
            ]
        );
        assert_eq!(transport.connected_urls(), vec!["http://test/stream?topic=t3"]);
    }

    #[tokio::test]
    async fn body_ending_without_sentinel_is_a_failure() {
        let transport = ScriptedTransport::new([Script::Body(vec![ScriptStep::event("partial")])]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport));

        service.spawn_stream(params(1));
        let messages = collect_until_terminal(&mut rx).await;

        assert_eq!(messages[0], (StreamMessage::Chunk("partial".into()), 1));
        assert_eq!(
            messages[1],
            (
                StreamMessage::Failed("connection closed before completion".into()),
                1
            )
        );
    }

    #[tokio::test]
    async fn connect_errors_become_failures() {
        let transport = ScriptedTransport::new([Script::Refuse { status: 503 }]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport));

        service.spawn_stream(params(9));
        let messages = collect_until_terminal(&mut rx).await;

        assert_eq!(
            messages,
            vec![(
                StreamMessage::Failed("upstream returned HTTP 503".into()),
                9
            )]
        );
    }

    #[tokio::test]
    async fn mid_body_error_becomes_failure() {
        let transport = ScriptedTransport::new([Script::Body(vec![
            ScriptStep::event("x"),
            ScriptStep::Error,
        ])]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport));

        service.spawn_stream(params(2));
        let messages = collect_until_terminal(&mut rx).await;
        assert!(matches!(messages.last(), Some((StreamMessage::Failed(_), 2))));
    }

    #[tokio::test]
    async fn named_events_are_not_forwarded() {
        let transport = ScriptedTransport::new([Script::Body(vec![
            ScriptStep::Bytes(b"event: progress\ndata: 50%\n\n".to_vec()),
            ScriptStep::event("text"),
            ScriptStep::event("[DONE]"),
        ])]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport));

        service.spawn_stream(params(1));
        let messages = collect_until_terminal(&mut rx).await;
        assert_eq!(
            messages,
            vec![
                (StreamMessage::Chunk("text".into()), 1),
                (StreamMessage::Done, 1)
            ]
        );
    }

    #[tokio::test]
    async fn cancellation_releases_connection_silently() {
        let transport = ScriptedTransport::new([Script::Body(vec![
            ScriptStep::event("first"),
            ScriptStep::Hang,
        ])]);
        let (service, mut rx) = TopicStreamService::with_transport(Arc::new(transport.clone()));

        let stream = params(4);
        let token = stream.cancel_token.clone();
        service.spawn_stream(stream);

        let (message, stream_id) = rx.recv().await.expect("first chunk");
        assert_eq!(message, StreamMessage::Chunk("first".into()));
        assert_eq!(stream_id, 4);

        token.cancel();
        for _ in 0..100 {
            if transport.releases() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(transport.releases(), 1);

        drop(service);
        assert!(rx.recv().await.is_none());
    }
}
