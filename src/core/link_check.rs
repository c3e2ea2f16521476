//! Post-stream verification of Markdown links.
//!
//! Generated text cites its sources as inline Markdown links. Once a stream
//! has completed, every distinct link target is probed and links whose
//! target cannot be reached are replaced with a fixed marker.

use std::collections::HashMap;
use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use pulldown_cmark::{Event, LinkType, Parser, Tag};
use reqwest::StatusCode;
use tracing::{debug, info};

pub const INVALID_LINK_MARKER: &str = "[INVALID LINK REMOVED]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    /// Byte range of the whole `[text](url)` construct in the source.
    pub range: Range<usize>,
    pub url: String,
}

/// Find inline links, skipping anything inside code spans or blocks.
pub fn find_markdown_links(text: &str) -> Vec<MarkdownLink> {
    Parser::new(text)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url,
                ..
            }) => Some(MarkdownLink {
                range,
                url: dest_url.to_string(),
            }),
            _ => None,
        })
        .collect()
}

#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Probes with `HEAD`, retrying with `GET` when the server does not
/// implement `HEAD`. Any status below 400 counts as reachable.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        let head = match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) => response.status(),
            Err(err) => {
                debug!(%url, error = %err, "link probe failed");
                return false;
            }
        };
        if head.as_u16() < 400 {
            return true;
        }
        if head != StatusCode::METHOD_NOT_ALLOWED && head != StatusCode::NOT_IMPLEMENTED {
            return false;
        }

        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response.status().as_u16() < 400,
            Err(err) => {
                debug!(%url, error = %err, "link probe failed");
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// Source text of each removed link, first occurrence order, no repeats.
    pub removed: Vec<String>,
    pub corrected: String,
}

impl LinkReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }
}

pub async fn scrub_invalid_links(text: &str, probe: &dyn UrlProbe) -> LinkReport {
    let links = find_markdown_links(text);

    let mut urls: Vec<&str> = Vec::new();
    for link in &links {
        if !urls.contains(&link.url.as_str()) {
            urls.push(&link.url);
        }
    }
    let verdicts = join_all(urls.iter().map(|url| probe.is_reachable(url))).await;
    let reachable: HashMap<&str, bool> = urls.into_iter().zip(verdicts).collect();

    let mut removed: Vec<String> = Vec::new();
    let mut corrected = String::with_capacity(text.len());
    let mut cursor = 0;
    for link in &links {
        if reachable.get(link.url.as_str()).copied().unwrap_or(false) {
            continue;
        }
        let original = &text[link.range.clone()];
        if !removed.iter().any(|seen| seen == original) {
            removed.push(original.to_string());
        }
        corrected.push_str(&text[cursor..link.range.start]);
        corrected.push_str(INVALID_LINK_MARKER);
        cursor = link.range.end;
    }
    corrected.push_str(&text[cursor..]);

    info!(
        links = links.len(),
        removed = removed.len(),
        "verified generated links"
    );
    LinkReport { removed, corrected }
}
