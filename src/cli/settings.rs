//! `set` / `unset` handling for configuration keys.

use std::fmt;
use std::path::PathBuf;

use reqwest::Url;

use crate::core::config::data::Config;
use crate::core::config::defaults::{DEFAULT_BASE_URL, DEFAULT_LINK_TIMEOUT_SECS};

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided value could not be parsed as a boolean.
    InvalidBoolean(String),
    /// The provided value is not a positive whole number of seconds.
    InvalidSeconds(String),
    /// The provided value is not an absolute http(s) URL.
    InvalidUrl(String),
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidBoolean(input) => write!(
                f,
                "Invalid boolean value: {input}. Use 'on' or 'off' (also accepts true/false, yes/no)"
            ),
            SettingError::InvalidSeconds(input) => {
                write!(f, "Invalid timeout: {input}. Use a whole number of seconds above zero")
            }
            SettingError::InvalidUrl(input) => {
                write!(f, "Invalid base URL: {input}. Use an absolute http:// or https:// URL")
            }
            SettingError::MissingArgs { hint, example } => write!(f, "{hint}\nExample: {example}"),
        }
    }
}

impl std::error::Error for SettingError {}

pub const SETTING_KEYS: [&str; 4] = ["base-url", "verify-links", "link-timeout", "log-file"];

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn validate_base_url(input: &str) -> Result<String, SettingError> {
    let trimmed = input.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(SettingError::InvalidUrl(trimmed.to_string())),
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn apply_set(config: &mut Config, key: &str, args: &[String]) -> Result<String, SettingError> {
    let input = args.join(" ");
    match key {
        "base-url" => {
            if input.trim().is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify the server base URL",
                    example: "topicstream set base-url http://127.0.0.1:5000",
                });
            }
            let url = validate_base_url(&input)?;
            config.base_url = Some(url.clone());
            Ok(format!("✅ Set base-url to: {url}"))
        }
        "verify-links" => {
            if input.trim().is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify on or off",
                    example: "topicstream set verify-links on",
                });
            }
            let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
            config.verify_links = Some(value);
            Ok(format!("✅ Set verify-links to: {}", format_bool(value)))
        }
        "link-timeout" => {
            let secs = input
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| SettingError::InvalidSeconds(input.clone()))?;
            config.link_timeout_secs = Some(secs);
            Ok(format!("✅ Set link-timeout to: {secs}s"))
        }
        "log-file" => {
            if input.trim().is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify the file that should receive logs",
                    example: "topicstream set log-file ~/topicstream.log",
                });
            }
            config.log_file = Some(PathBuf::from(input.trim()));
            Ok(format!("✅ Set log-file to: {}", input.trim()))
        }
        other => Err(SettingError::UnknownKey(other.to_string())),
    }
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "base-url" => {
            config.base_url = None;
            Ok(format!("✅ Unset base-url (will use default: {DEFAULT_BASE_URL})"))
        }
        "verify-links" => {
            config.verify_links = None;
            Ok("✅ Unset verify-links (will use default: off)".to_string())
        }
        "link-timeout" => {
            config.link_timeout_secs = None;
            Ok(format!(
                "✅ Unset link-timeout (will use default: {DEFAULT_LINK_TIMEOUT_SECS}s)"
            ))
        }
        "log-file" => {
            config.log_file = None;
            Ok("✅ Unset log-file".to_string())
        }
        other => Err(SettingError::UnknownKey(other.to_string())),
    }
}
