use crate::core::config::data::{path_display, Config};
use crate::core::config::defaults::{DEFAULT_BASE_URL, DEFAULT_LINK_TIMEOUT_SECS};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match self.verify_links_enabled() {
            true => println!("  verify-links: on"),
            false => println!("  verify-links: off"),
        }
        match self.link_timeout_secs {
            Some(secs) => println!("  link-timeout: {secs}s"),
            None => println!("  link-timeout: (unset, using {DEFAULT_LINK_TIMEOUT_SECS}s)"),
        }
        match &self.log_file {
            Some(path) => println!("  log-file: {}", path_display(path)),
            None => println!("  log-file: (unset)"),
        }
    }
}
