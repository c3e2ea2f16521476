use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the server exposing the `/stream` endpoint
    pub base_url: Option<String>,
    /// Probe Markdown links after a stream completes and strip dead ones
    pub verify_links: Option<bool>,
    /// Per-link probe timeout in seconds
    pub link_timeout_secs: Option<u64>,
    /// File that receives diagnostic logs
    pub log_file: Option<PathBuf>,
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
