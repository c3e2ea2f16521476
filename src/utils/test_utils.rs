use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::core::transport::{ChunkStream, StreamTransport, TransportError};

#[derive(Debug, Clone)]
pub enum ScriptStep {
    Bytes(Vec<u8>),
    Error,
    Hang,
}

impl ScriptStep {
    pub fn event(data: &str) -> Self {
        ScriptStep::Bytes(format!("data: {data}\n\n").into_bytes())
    }
}

#[derive(Debug, Clone)]
pub enum Script {
    Body(Vec<ScriptStep>),
    Refuse { status: u16 },
}

#[derive(Default)]
struct ScriptedState {
    scripts: Mutex<VecDeque<Script>>,
    urls: Mutex<Vec<String>>,
    releases: AtomicUsize,
}

struct ReleaseGuard(Arc<ScriptedState>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory transport that replays one script per `connect` call.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<ScriptedState>,
}

impl ScriptedTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        let transport = Self::default();
        transport
            .state
            .scripts
            .lock()
            .expect("scripts lock")
            .extend(scripts);
        transport
    }

    pub fn connected_urls(&self) -> Vec<String> {
        self.state.urls.lock().expect("urls lock").clone()
    }

    /// Number of response bodies that have been dropped.
    pub fn releases(&self) -> usize {
        self.state.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn connect(&self, url: &str) -> Result<ChunkStream, TransportError> {
        self.state
            .urls
            .lock()
            .expect("urls lock")
            .push(url.to_string());
        let script = self
            .state
            .scripts
            .lock()
            .expect("scripts lock")
            .pop_front()
            .unwrap_or(Script::Body(Vec::new()));

        let steps = match script {
            Script::Refuse { status } => {
                return Err(TransportError::Status {
                    status,
                    detail: String::new(),
                })
            }
            Script::Body(steps) => steps,
        };

        let guard = ReleaseGuard(Arc::clone(&self.state));
        let stream = futures_util::stream::unfold(
            (steps.into_iter(), guard),
            |(mut steps, guard)| async move {
                match steps.next() {
                    Some(ScriptStep::Bytes(bytes)) => Some((Ok(bytes), (steps, guard))),
                    Some(ScriptStep::Error) => {
                        Some((Err(TransportError::ClosedBeforeDone), (steps, guard)))
                    }
                    Some(ScriptStep::Hang) => {
                        let _held = guard;
                        futures_util::future::pending::<()>().await;
                        None
                    }
                    None => None,
                }
            },
        );
        Ok(stream.boxed())
    }
}

pub fn disable_proxies() {
    for var in [
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        std::env::remove_var(var);
    }
    std::env::set_var("NO_PROXY", "*");
    std::env::set_var("no_proxy", "*");
}

/// Serve the given raw HTTP responses to consecutive connections on a
/// loopback port. The task resolves to the request line of each request.
pub async fn serve_sequence(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let handle = tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|window| window == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => head.extend_from_slice(&chunk[..read]),
                }
            }
            let head = String::from_utf8_lossy(&head);
            request_lines.push(head.lines().next().unwrap_or_default().to_string());

            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        request_lines
    });

    (format!("http://{addr}"), handle)
}

pub async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let (base_url, handle) = serve_sequence(vec![response]).await;
    let first = tokio::spawn(async move {
        handle
            .await
            .ok()
            .and_then(|lines| lines.into_iter().next())
            .unwrap_or_default()
    });
    (base_url, first)
}
