//! Query string and urlencoded form decoding.

use std::collections::HashMap;

use url::form_urlencoded;

/// Decode `key=value` pairs separated by `&`.
///
/// Percent-escapes and `+` are decoded, a later duplicate key replaces an
/// earlier one, and a segment without `=` becomes a key with an empty value.
pub fn parse_pairs(input: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(input).into_owned().collect()
}

/// Decode a query string (the part of the target after `?`).
pub fn parse_query(query: &str) -> HashMap<String, String> {
    parse_pairs(query.as_bytes())
}
