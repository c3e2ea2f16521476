use std::time::Duration;

use crate::core::config::data::Config;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LINK_TIMEOUT_SECS: u64 = 5;
pub const BASE_URL_ENV: &str = "TOPICSTREAM_BASE_URL";

impl Config {
    /// Resolve the base URL: explicit override, then environment, then the
    /// config file, then the built-in default.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> String {
        let from_env = std::env::var(BASE_URL_ENV).ok();
        Self::pick_base_url(cli_override, from_env.as_deref(), self.base_url.as_deref())
    }

    pub(crate) fn pick_base_url(
        cli_override: Option<&str>,
        from_env: Option<&str>,
        from_config: Option<&str>,
    ) -> String {
        [cli_override, from_env, from_config]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn verify_links_enabled(&self) -> bool {
        self.verify_links.unwrap_or(false)
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(
            self.link_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_LINK_TIMEOUT_SECS),
        )
    }
}
