//! `multipart/form-data` field extraction.
//!
//! Only simple fields are captured. Parts carrying their own `Content-Type`
//! are file uploads and are skipped, as are parts that cannot be parsed.

use std::collections::HashMap;

use log::debug;

enum Part<'a> {
    Field { name: &'a str, value: &'a str },
    File,
}

/// Collect `name -> value` for every simple field between the first and last delimiter.
///
/// A later field with the same name replaces an earlier one.
pub(crate) fn parse_fields(raw: &[u8], boundary: &str) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(raw);
    let delimiter = format!("--{boundary}");
    let segments: Vec<&str> = text.split(delimiter.as_str()).collect();

    let mut fields = HashMap::new();
    if segments.len() < 3 {
        debug!("Multipart body has no complete part");
        return fields;
    }

    // First segment is the preamble, last is the closing `--` and epilogue
    for segment in &segments[1..segments.len() - 1] {
        match parse_part(segment) {
            Some(Part::Field { name, value }) => {
                fields.insert(name.to_string(), value.to_string());
            }
            Some(Part::File) => debug!("Skipping file part"),
            None => debug!("Skipping malformed multipart segment"),
        }
    }

    fields
}

fn parse_part(segment: &str) -> Option<Part<'_>> {
    let segment = segment
        .strip_prefix("\r\n")
        .or_else(|| segment.strip_prefix('\n'))
        .unwrap_or(segment);

    let (headers, content) = match segment.split_once("\r\n\r\n") {
        Some(split) => split,
        None => segment.split_once("\n\n")?,
    };

    let mut name = None;
    for line in headers.lines() {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        let header = header.trim();

        if header.eq_ignore_ascii_case("Content-Type") {
            return Some(Part::File);
        }
        if header.eq_ignore_ascii_case("Content-Disposition") {
            name = disposition_param(value, "name");
        }
    }

    let value = content.trim_end_matches(|c: char| c == '\r' || c == '\n');
    Some(Part::Field { name: name?, value })
}

fn disposition_param<'a>(disposition: &'a str, param: &str) -> Option<&'a str> {
    disposition
        .split(';')
        .filter_map(|item| item.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(param))
        .map(|(_, value)| value.trim().trim_matches('"'))
}
