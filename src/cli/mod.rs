//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::{Parser, Subcommand};

use crate::cli::ask::{run_ask, AskOptions, AskOutcome};
use crate::cli::settings::{apply_set, apply_unset, validate_base_url};
use crate::core::config::Config;
use crate::ui::event_loop::run_watch;
use crate::utils::logging::{init_tracing, LogTarget};

fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{} ({}, built {} with rustc {})",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
            option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
            option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        )
    })
}

#[derive(Parser)]
#[command(name = "topicstream")]
#[command(version, long_version = long_version())]
#[command(about = "Stream generated text about a topic into your terminal")]
#[command(
    long_about = "topicstream sends a topic to a text-generation server's /stream endpoint \
and renders the server-sent-event response as it arrives.\n\n\
Environment Variables:\n\
  TOPICSTREAM_BASE_URL   Server base URL (defaults to http://127.0.0.1:5000)\n\
  TOPICSTREAM_LOG        Log filter, e.g. 'debug' or 'topicstream=trace'\n\n\
Controls:\n\
  Type                   Enter a topic in the input field\n\
  Enter                  Start streaming (replaces any stream in progress)\n\
  Up/Down/PgUp/PgDn      Scroll the output\n\
  Esc or Ctrl+C          Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL (overrides TOPICSTREAM_BASE_URL and the config file)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive streaming view (default)
    Watch,
    /// Stream one topic to stdout and exit
    Ask {
        /// Topic words; joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        topic: Vec<String>,
        /// Probe Markdown links once the stream completes and strip dead ones
        #[arg(long)]
        verify_links: bool,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

fn resolve_base_url(config: &Config, cli_override: Option<&str>) -> Result<String, Box<dyn Error>> {
    Ok(validate_base_url(&config.resolve_base_url(cli_override))?)
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = Config::load()?;
    let log_file = args.log_file.clone().or_else(|| config.log_file.clone());

    match args.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            let target = match log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Disabled,
            };
            init_tracing(target)?;
            let base_url = resolve_base_url(&config, args.base_url.as_deref())?;
            run_watch(base_url).await
        }
        Commands::Ask {
            topic,
            verify_links,
        } => {
            let target = match log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            init_tracing(target)?;
            let options = AskOptions {
                base_url: resolve_base_url(&config, args.base_url.as_deref())?,
                verify_links: verify_links || config.verify_links_enabled(),
                link_timeout: config.link_timeout(),
            };
            match run_ask(topic, options).await? {
                AskOutcome::Completed => Ok(()),
                AskOutcome::Failed | AskOutcome::Interrupted | AskOutcome::EmptyTopic => {
                    std::process::exit(1)
                }
            }
        }
        Commands::Set { key, value } => {
            let Some(key) = key else {
                config.print_all();
                return Ok(());
            };
            let mut config = config;
            match apply_set(&mut config, &key, &value) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Unset { key } => {
            let mut config = config;
            match apply_unset(&mut config, &key) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}
