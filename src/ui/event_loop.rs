//! Event polling, dispatching, and UI rendering loop for the watch view.
//!
//! The loop owns the [`WatchApp`] outright: terminal input and stream
//! messages arrive on two channels and are applied on this task only, so
//! the current stream handle is never shared.

use std::{
    error::Error,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tracing::info;

use crate::core::session::StreamSession;
use crate::core::topic_stream::{StreamMessage, StreamReceiver, TopicStreamService};
use crate::ui::app::{ViewContext, WatchApp};
use crate::ui::renderer::ui;

use super::lifecycle::{restore_terminal, setup_terminal, WatchTerminal};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

const MAX_FPS: u64 = 60;

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Apply one terminal event. Returns true when the screen needs redrawing.
pub fn process_ui_event(
    app: &mut WatchApp,
    service: &TopicStreamService,
    event: UiEvent,
    ctx: ViewContext,
) -> bool {
    match event {
        UiEvent::Crossterm(Event::Key(key)) => {
            if let Some(params) = app.handle_key(key, ctx) {
                service.spawn_stream(params);
            }
            true
        }
        UiEvent::Crossterm(Event::Resize(_, _)) => true,
        UiEvent::Crossterm(_) => false,
    }
}

/// Apply every stream message already waiting. Returns true when any of
/// them changed what is on screen.
pub fn drain_stream_updates(app: &mut WatchApp, rx: &mut StreamReceiver) -> bool {
    let mut changed = false;
    while let Ok((message, stream_id)) = rx.try_recv() {
        changed |= apply_stream_message(app, message, stream_id);
    }
    changed
}

fn apply_stream_message(app: &mut WatchApp, message: StreamMessage, stream_id: u64) -> bool {
    app.handle_stream_message(message, stream_id)
}

fn try_draw_frame(
    app: &WatchApp,
    terminal: &mut WatchTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> std::io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    terminal.draw(|f| ui(f, app))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

pub async fn run_watch(base_url: String) -> Result<(), Box<dyn Error>> {
    let (service, mut rx) = TopicStreamService::new(reqwest::Client::new());
    let mut app = WatchApp::new(StreamSession::new(base_url));
    info!(base_url = app.session.base_url(), "starting watch view");

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = loop {
        if app.exit_requested {
            break Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &mut terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break Err(err.into());
        }

        let size = match terminal.size() {
            Ok(size) => size,
            Err(err) => break Err(err.into()),
        };
        let ctx = ViewContext {
            term_width: size.width,
            term_height: size.height,
        };

        tokio::select! {
            Some(event) = event_rx.recv() => {
                request_redraw |= process_ui_event(&mut app, &service, event, ctx);
                while let Ok(event) = event_rx.try_recv() {
                    request_redraw |= process_ui_event(&mut app, &service, event, ctx);
                }
            }
            Some((message, stream_id)) = rx.recv() => {
                request_redraw |= apply_stream_message(&mut app, message, stream_id);
                request_redraw |= drain_stream_updates(&mut app, &mut rx);
            }
            _ = tokio::time::sleep(frame_duration), if request_redraw => {}
        }
    };

    app.session.cancel();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    result
}
