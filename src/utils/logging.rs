//! Diagnostic logging setup.
//!
//! The full-screen interface owns the terminal, so it only logs when a file
//! is configured. The streaming command can fall back to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "TOPICSTREAM_LOG";
const DEFAULT_FILTER: &str = "warn,topicstream=info";

pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Disabled,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing(target: LogTarget<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true);

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| -> Box<dyn std::error::Error> { e })?;
        }
        LogTarget::Stderr => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| -> Box<dyn std::error::Error> { e })?;
        }
        LogTarget::Disabled => {}
    }
    Ok(())
}
