//! Path and query parsing helpers.
//!
//! Nested resource identifiers are encoded positionally in the URL path
//! (`/doip-simulation/platform/X2024/gateway/GW`); these helpers pull them
//! out so every handler behaves identically.

use std::collections::HashMap;

use url::form_urlencoded;

/// Return the path segment following the segment named `name`.
///
/// Trailing slashes are irrelevant; an empty follower counts as absent.
///
/// ```
/// # use doip_sim_http::routing::path_segment_value;
/// let path = "/doip-simulation/platform/X2024/gateway/GW";
/// assert_eq!(path_segment_value(path, "platform"), Some("X2024"));
/// assert_eq!(path_segment_value(path, "gateway"), Some("GW"));
/// assert_eq!(path_segment_value(path, "ecu"), None);
/// assert_eq!(path_segment_value("/doip-simulation/platform/", "platform"), None);
/// ```
pub fn path_segment_value<'a>(path: &'a str, name: &str) -> Option<&'a str> {
    let mut segments = path.split('/');
    while let Some(segment) = segments.next() {
        if segment == name {
            return segments.next().filter(|value| !value.is_empty());
        }
    }
    None
}

/// Parse a raw query string into a key → value map.
///
/// Pairs without exactly one `=` are dropped silently; keys and values are
/// percent-decoded. An empty query yields an empty map.
///
/// ```
/// # use doip_sim_http::routing::parse_query;
/// let params = parse_query("status=RUNNING&x=1");
/// assert_eq!(params.get("status").map(String::as_str), Some("RUNNING"));
/// assert_eq!(params.get("x").map(String::as_str), Some("1"));
/// assert!(parse_query("").is_empty());
/// assert!(parse_query("bad").is_empty());
/// ```
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in query.split('&') {
        if pair.split('=').count() != 2 {
            continue;
        }
        if let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).into_owned().next() {
            params.insert(key, value);
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_value_ignores_trailing_slash() {
        assert_eq!(
            path_segment_value("/doip-simulation/platform/X2024", "platform"),
            Some("X2024")
        );
        assert_eq!(
            path_segment_value("/doip-simulation/platform/X2024/", "platform"),
            Some("X2024")
        );
    }

    #[test]
    fn segment_value_missing_follower() {
        assert_eq!(path_segment_value("/doip-simulation/platform", "platform"), None);
        assert_eq!(path_segment_value("/", "platform"), None);
        assert_eq!(path_segment_value("", "platform"), None);
    }

    #[test]
    fn segment_value_first_occurrence_wins() {
        assert_eq!(
            path_segment_value("/platform/A/platform/B", "platform"),
            Some("A")
        );
    }

    #[test]
    fn query_drops_malformed_pairs() {
        let params = parse_query("status=RUNNING&bad&a=b=c&x=1");
        assert_eq!(params.len(), 2);
        assert_eq!(params["status"], "RUNNING");
        assert_eq!(params["x"], "1");
    }

    #[test]
    fn query_percent_decodes_keys_and_values() {
        let params = parse_query("na%20me=X%202024&status=RUNNING");
        assert_eq!(params["na me"], "X 2024");
        assert_eq!(params["status"], "RUNNING");
    }

    #[test]
    fn query_empty_value_is_kept() {
        let params = parse_query("status=");
        assert_eq!(params["status"], "");
    }
}
