//! Share links for a finished descriptor.
//!
//! Both link forms carry the info hash, the first tracker (optional), every
//! web seed and the torrent name as a display hint:
//!
//! - `magnet:?xt=urn:btih:<hash>&tr=..&ws=..&dn=..` for regular clients,
//! - `bittorrent://<hash>?tr=..&ws=..&dn=..` for browsers that open
//!   website torrents directly.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::descriptor::Descriptor;

/// Everything except the RFC 3986 unreserved characters is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds a magnet link for `descriptor`.
///
/// With `include_tracker`, the `announce` URL is added as `tr`. Without it,
/// clients have to find peers through the DHT or the web seeds.
///
/// ```
/// use twt_gen::metainfo::{magnet_link, Descriptor, FileLayout, Info};
///
/// let descriptor = Descriptor {
///     created_by: None,
///     creation_date: None,
///     encoding: None,
///     announce: Some("udp://tracker.example:80".into()),
///     announce_list: Vec::new(),
///     url_list: Vec::new(),
///     comment: None,
///     info: Info {
///         name: "my site".into(),
///         piece_length: 16384,
///         pieces: vec![[0u8; 20]],
///         layout: FileLayout::Single { length: 1 },
///     },
/// };
///
/// let link = magnet_link(&descriptor, true);
/// assert!(link.starts_with("magnet:?xt=urn:btih:"));
/// assert!(link.ends_with("&tr=udp%3A%2F%2Ftracker.example%3A80&dn=my%20site"));
/// ```
pub fn magnet_link(descriptor: &Descriptor, include_tracker: bool) -> String {
    let mut uri = format!("magnet:?xt=urn:btih:{}", descriptor.info_hash());
    for (key, value) in link_params(descriptor, include_tracker) {
        uri.push_str(&format!("&{}={}", key, encode(value)));
    }
    uri
}

/// Builds a `bittorrent://` link for `descriptor`.
pub fn browser_link(descriptor: &Descriptor, include_tracker: bool) -> String {
    let query = link_params(descriptor, include_tracker)
        .map(|(key, value)| format!("{}={}", key, encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        format!("bittorrent://{}", descriptor.info_hash())
    } else {
        format!("bittorrent://{}?{}", descriptor.info_hash(), query)
    }
}

fn link_params(
    descriptor: &Descriptor,
    include_tracker: bool,
) -> impl Iterator<Item = (&'static str, &str)> {
    let tracker = descriptor
        .announce
        .as_deref()
        .filter(|_| include_tracker)
        .map(|url| ("tr", url));
    let seeds = descriptor.url_list.iter().map(|url| ("ws", url.as_str()));
    let name = std::iter::once(("dn", descriptor.info.name.as_str()));

    tracker.into_iter().chain(seeds).chain(name)
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
