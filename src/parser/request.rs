//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request as handed over by the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, path plus any query string
    pub target: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The raw request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `target` - The raw request target
    /// * `version` - The HTTP version
    /// * `headers` - The HTTP headers
    pub fn new(method: Method, target: impl Into<String>, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        Self {
            method,
            target: target.into(),
            version,
            headers,
            body: Vec::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(
        method: Method,
        target: impl Into<String>,
        version: HttpVersion,
        headers: HashMap<String, String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let mut request = Self::new(method, target, version, headers);
        request.body = body.into();
        request
    }

    /// Get a header value.
    ///
    /// Header names are compared case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The declared Content-Type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("Content-Type").map(String::as_str)
    }

    /// The declared Content-Length, if any.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the header is absent, or an error if its value is not a byte count
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        self.get_header("Content-Length")
            .map(|value| {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidContentLength(value.clone()))
            })
            .transpose()
    }
}

/// Find the end of the request head.
///
/// # Returns
///
/// The offset just past the first blank line that terminates the header block, if present.
/// A CRLF blank line and a bare LF blank line are both accepted, whichever comes first.
pub fn find_head_end(input: &[u8]) -> Option<usize> {
    let crlf = input.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4);
    let lf = input.windows(2).position(|w| w == b"\n\n").map(|pos| pos + 2);

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Parse the request line and headers from a byte slice.
///
/// Anything after the header block is ignored; the returned request has an empty body.
pub fn parse_head(input: &[u8]) -> Result<HttpRequest, Error> {
    let head = match find_head_end(input) {
        Some(end) => &input[..end],
        None => input,
    };

    let head = match std::str::from_utf8(head) {
        Ok(s) => s,
        Err(_) => return Err(Error::MalformedRequestLine("Invalid UTF-8".to_string())),
    };

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    // Split the request line into method, target, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    // Only origin-form targets and the asterisk form are routable
    let target = parts[1];
    if !target.starts_with('/') && target != "*" {
        return Err(Error::InvalidPath(target.to_string()));
    }
    let target = target.to_string();

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version.requires_host() && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    Ok(HttpRequest::new(method, target, version, headers))
}

/// Parse a complete HTTP request, head and body, from a byte slice.
///
/// With a Content-Length header the body is exactly that many bytes; without one
/// it is everything that follows the head.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let mut request = parse_head(input)?;

    let body = match find_head_end(input) {
        Some(end) => &input[end..],
        None => &[][..],
    };

    request.body = match request.content_length()? {
        Some(expected) if expected > body.len() => {
            return Err(Error::IncompleteBody { expected, received: body.len() });
        }
        Some(expected) => body[..expected].to_vec(),
        None => body.to_vec(),
    };

    Ok(request)
}
