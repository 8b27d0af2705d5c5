//! Request target handling: sanitizing, base-path stripping, path normalization.

use std::borrow::Cow;

/// Characters kept by [`sanitize_target`] besides ASCII letters and digits.
const URL_PUNCTUATION: &str = "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=";

/// Drop every character that cannot appear in a URL.
///
/// Control characters, whitespace and non-ASCII characters are removed; the
/// target is borrowed unchanged when it is already clean.
pub fn sanitize_target(raw: &str) -> Cow<'_, str> {
    let is_url_char = |c: char| c.is_ascii_alphanumeric() || URL_PUNCTUATION.contains(c);

    if raw.chars().all(is_url_char) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(raw.chars().filter(|&c| is_url_char(c)).collect())
    }
}

/// Collapse a path to the form routes are stored under.
///
/// An empty path becomes `/`, and trailing slashes are removed from anything but the root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Remove `base` from the start of `path` when it ends on a segment boundary.
pub fn strip_base_path<'a>(path: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return path;
    }

    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Split a raw target into its route path and query string.
///
/// The target is sanitized, any fragment is dropped, the base path is stripped
/// and the remaining path normalized.
pub fn split_target(raw: &str, base_path: &str) -> (String, Option<String>) {
    let target = sanitize_target(raw);
    let target = match target.split_once('#') {
        Some((before, _)) => before,
        None => &*target,
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (target, None),
    };

    (normalize_path(strip_base_path(path, base_path)), query)
}
