//! URL utilities for building stream request targets
//!
//! Base URLs come from user configuration and may carry trailing slashes;
//! these helpers normalize them and append the endpoint and the
//! percent-encoded topic query.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::api::{STREAM_ENDPOINT, TOPIC_PARAM};
use crate::core::topic::Topic;

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use topicstream::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000"), "http://127.0.0.1:5000");
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000///"), "http://127.0.0.1:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use topicstream::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:5000/", "/stream"),
///     "http://localhost:5000/stream"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Everything outside the RFC 3986 unreserved set.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a value for use inside a URL query component.
///
/// Bytes in the RFC 3986 unreserved set pass through; everything else,
/// including space, is written as `%XX`.
///
/// ```
/// use topicstream::utils::url::encode_query_component;
///
/// assert_eq!(encode_query_component("moon landing"), "moon%20landing");
/// assert_eq!(encode_query_component("a&b=c"), "a%26b%3Dc");
/// ```
pub fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// Build the `GET` target for streaming `topic` from `base_url`.
pub fn build_stream_url(base_url: &str, topic: &Topic) -> String {
    format!(
        "{}?{}={}",
        construct_api_url(base_url, STREAM_ENDPOINT),
        TOPIC_PARAM,
        encode_query_component(topic.as_str())
    )
}
