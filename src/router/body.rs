//! Request body decoding by content type.

use std::collections::HashMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::router::error::BodyError;
use crate::router::multipart;
use crate::router::query::parse_pairs;

/// A request body after interpretation according to its content type.
///
/// Serializes as `null`, a string map, or the JSON value itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum DecodedBody {
    /// No body, an unsupported content type, or a body that failed to decode.
    #[default]
    Empty,
    /// Fields from an urlencoded or multipart form.
    Form(HashMap<String, String>),
    /// A parsed JSON document.
    Json(Value),
}

impl DecodedBody {
    /// true if nothing was decoded.
    pub fn is_empty(&self) -> bool {
        matches!(self, DecodedBody::Empty)
    }

    /// Look up a field by name.
    ///
    /// For JSON bodies only top-level string members are returned.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            DecodedBody::Form(fields) => fields.get(name).map(String::as_str),
            DecodedBody::Json(value) => value.get(name).and_then(Value::as_str),
            DecodedBody::Empty => None,
        }
    }

    /// The form fields, if this is a form body.
    pub fn as_form(&self) -> Option<&HashMap<String, String>> {
        match self {
            DecodedBody::Form(fields) => Some(fields),
            _ => None,
        }
    }

    /// The JSON value, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            DecodedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize the body into `T`.
    ///
    /// Form bodies deserialize as a map of strings, so `T` should use string fields.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let value = match self {
            DecodedBody::Empty => return Err(BodyError::Empty),
            DecodedBody::Form(fields) => serde_json::to_value(fields)?,
            DecodedBody::Json(value) => value.clone(),
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// The body formats the decoder distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// No Content-Type header.
    Absent,
    /// `multipart/form-data`
    Multipart,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// `application/json`
    Json,
    /// Anything else; ignored.
    Other,
}

impl BodyKind {
    /// Classify a Content-Type header value.
    ///
    /// The media type is compared case-insensitively and parameters are ignored.
    pub fn of(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyKind::Absent;
        };

        match media_type(content_type).as_str() {
            "multipart/form-data" => BodyKind::Multipart,
            "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
            "application/json" => BodyKind::Json,
            _ => BodyKind::Other,
        }
    }
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extract the `boundary` parameter of a multipart content type.
pub fn boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Decode `raw` according to `content_type`, reporting why decoding failed.
pub fn try_decode_body(content_type: Option<&str>, raw: &[u8]) -> Result<DecodedBody, BodyError> {
    match BodyKind::of(content_type) {
        BodyKind::Absent | BodyKind::Other => Ok(DecodedBody::Empty),
        BodyKind::Multipart => {
            let boundary = content_type
                .and_then(boundary)
                .ok_or(BodyError::MissingBoundary)?;
            Ok(DecodedBody::Form(multipart::parse_fields(raw, boundary)))
        }
        BodyKind::UrlEncoded => Ok(DecodedBody::Form(parse_pairs(raw))),
        BodyKind::Json => Ok(DecodedBody::Json(serde_json::from_slice(raw)?)),
    }
}

/// Decode `raw` according to `content_type`.
///
/// Decoding never fails: a body that cannot be decoded is logged and comes back empty.
pub fn decode_body(content_type: Option<&str>, raw: &[u8]) -> DecodedBody {
    match try_decode_body(content_type, raw) {
        Ok(body) => body,
        Err(e) => {
            warn!("Discarding request body: {e}");
            DecodedBody::Empty
        }
    }
}
