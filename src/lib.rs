//! topicstream submits a topic to a streaming text endpoint and renders the
//! server-sent-event response as it arrives.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the submission session, the per-stream render state
//!   machine, the event-stream decoder, the transport, configuration, and
//!   post-stream link verification.
//! - [`ui`] renders the terminal interface and runs the event loop that
//!   routes keystrokes and stream messages into the session.
//! - [`cli`] parses arguments and dispatches to the interface, the one-shot
//!   `ask` runner, or configuration commands.
//! - [`api`] holds the wire constants of the `/stream` endpoint.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
