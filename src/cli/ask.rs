//! TUI-less "ask" command: stream one topic to stdout.

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::link_check::{scrub_invalid_links, HttpProbe, LinkReport, UrlProbe};
use crate::core::renderer::{RenderUpdate, StreamState};
use crate::core::session::StreamSession;
use crate::core::topic::Topic;
use crate::core::topic_stream::{StreamReceiver, TopicStreamService};
use crate::core::transport::HttpTransport;

pub struct AskOptions {
    pub base_url: String,
    pub verify_links: bool,
    pub link_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    Completed,
    Failed,
    Interrupted,
    /// Nothing but whitespace was given; no request was made.
    EmptyTopic,
}

pub async fn run_ask(words: Vec<String>, options: AskOptions) -> Result<AskOutcome, Box<dyn Error>> {
    let Some(topic) = Topic::from_words(&words) else {
        eprintln!("Usage: topicstream ask <topic>");
        return Ok(AskOutcome::EmptyTopic);
    };

    let client = reqwest::Client::new();
    let (service, mut rx) =
        TopicStreamService::with_transport(Arc::new(HttpTransport::new(client.clone())));
    let mut session = StreamSession::new(options.base_url);

    let mut stdout = io::stdout();
    let outcome = stream_topic(
        &topic,
        &mut session,
        &service,
        &mut rx,
        &mut stdout,
        wait_for_interrupt(tokio::signal::ctrl_c()),
    )
    .await?;

    if outcome == AskOutcome::Completed && options.verify_links {
        let probe = HttpProbe::new(client, options.link_timeout);
        verify_and_report(session.text(), &probe, &mut stdout).await?;
    }

    Ok(outcome)
}

/// Resolve when `signal` reports an interrupt. A handler that could not be
/// installed never fires.
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(error = %err, "could not listen for Ctrl+C; interrupts are disabled");
        futures_util::future::pending::<()>().await;
    }
}

/// Submit `topic` and copy the growing output to `out` until the stream
/// reaches a terminal state or `interrupt` resolves.
pub async fn stream_topic<W, F>(
    topic: &Topic,
    session: &mut StreamSession,
    service: &TopicStreamService,
    rx: &mut StreamReceiver,
    out: &mut W,
    interrupt: F,
) -> io::Result<AskOutcome>
where
    W: Write,
    F: Future<Output = ()>,
{
    let Some(params) = session.submit(topic.as_str()) else {
        return Ok(AskOutcome::Completed);
    };
    service.spawn_stream(params);

    tokio::pin!(interrupt);
    let mut printed = 0;
    loop {
        let received = tokio::select! {
            _ = &mut interrupt => {
                session.cancel();
                writeln!(out, "\nExecution interrupted by user.")?;
                out.flush()?;
                return Ok(AskOutcome::Interrupted);
            }
            received = rx.recv() => received,
        };

        let Some((message, stream_id)) = received else {
            return Ok(AskOutcome::Failed);
        };
        let update = session.handle_message(message, stream_id);
        if update == RenderUpdate::Ignored {
            continue;
        }

        let text = session.text();
        out.write_all(text[printed..].as_bytes())?;
        printed = text.len();
        out.flush()?;

        if update.is_terminal() {
            writeln!(out)?;
            out.flush()?;
            return Ok(match session.state() {
                StreamState::Completed => AskOutcome::Completed,
                _ => AskOutcome::Failed,
            });
        }
    }
}

pub async fn verify_and_report<W: Write>(
    text: &str,
    probe: &dyn UrlProbe,
    out: &mut W,
) -> io::Result<LinkReport> {
    let report = scrub_invalid_links(text, probe).await;
    if !report.is_clean() {
        writeln!(
            out,
            "\n---\nThe following links were removed after verification failure:"
        )?;
        for faulty in &report.removed {
            writeln!(out, "- {faulty}")?;
        }
        writeln!(out, "\nCorrected output (with invalid links removed):\n")?;
        writeln!(out, "{}", report.corrected.trim())?;
        out.flush()?;
    }
    Ok(report)
}
