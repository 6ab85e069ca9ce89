//! Payload decoding for JSON and form-encoded deliveries.
//!
//! GitHub sends push payloads either as `application/json` or as
//! `application/x-www-form-urlencoded` with the JSON in a `payload` field.
//! When the content type is missing or unrecognised the decoder tries JSON
//! first and the form field second. That order is part of the contract: it
//! decides which ambiguous bodies are accepted.

use serde_json::Value;

use crate::headers::{Headers, HEADER_CONTENT_TYPE};
use crate::DecodeError;

const FORM_PAYLOAD_FIELD: &str = "payload";

// ---------------------------------------------------------------------------
// Payload model
// ---------------------------------------------------------------------------

/// The subset of a push payload the dispatcher uses.
///
/// Built from an already decoded document with [`PushPayload::from_value`].
/// Reading never fails: a missing field, `null`, or a value of an unexpected
/// type reads as absent (or empty for lists).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPayload {
    pub repository: Option<Repository>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub git_ref: Option<String>,
    pub commits: Vec<CommitRecord>,
}

impl PushPayload {
    pub fn from_value(value: &Value) -> Self {
        Self {
            repository: value.get("repository").map(Repository::from_value),
            before: string_field(value, "before"),
            after: string_field(value, "after"),
            git_ref: string_field(value, "ref"),
            commits: list_field(value, "commits").iter().map(CommitRecord::from_value).collect(),
        }
    }

    /// Repository `owner/name`, if present.
    pub fn repository_name(&self) -> Option<&str> {
        self.repository.as_ref().and_then(|r| r.full_name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub full_name: Option<String>,
}

impl Repository {
    fn from_value(value: &Value) -> Self {
        Self { full_name: string_field(value, "full_name") }
    }
}

/// Paths touched by one commit, grouped by change kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRecord {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl CommitRecord {
    fn from_value(value: &Value) -> Self {
        Self {
            added: string_items(value, "added"),
            modified: string_items(value, "modified"),
            removed: string_items(value, "removed"),
        }
    }

    /// All paths of the commit: added, then modified, then removed.
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.added.iter().chain(&self.modified).chain(&self.removed)
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

fn list_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

/// String entries of a list field; other entries are skipped.
fn string_items(value: &Value, key: &str) -> Vec<String> {
    list_field(value, key).iter().filter_map(Value::as_str).map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Content type
// ---------------------------------------------------------------------------

/// Declared body encoding, with parameters such as `charset` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Form,
    /// Missing, empty, or anything else.
    Unspecified,
}

impl ContentType {
    pub fn from_headers(headers: &Headers) -> Self {
        let Some(value) = headers.get(HEADER_CONTENT_TYPE) else {
            return Self::Unspecified;
        };
        let media_type = value.split(';').next().unwrap_or_default().trim();
        if media_type.eq_ignore_ascii_case("application/json") {
            Self::Json
        } else if media_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Self::Form
        } else {
            Self::Unspecified
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a raw (already authenticated) body into a JSON document.
///
/// Any JSON value is accepted; only push deliveries are later read as a
/// [`PushPayload`]. Invalid UTF-8 sequences are replaced before parsing.
///
/// # Errors
///
/// - [`DecodeError::Json`] if the selected JSON text does not parse.
/// - [`DecodeError::MissingFormPayload`] if a declared form body has no
///   non-empty `payload` field.
///
/// For an unspecified content type where both attempts fail, the error from
/// the JSON attempt is returned unless the form field existed, in which case
/// the error from parsing that field is returned.
pub fn decode(headers: &Headers, raw_body: &[u8]) -> Result<Value, DecodeError> {
    let text = String::from_utf8_lossy(raw_body);

    match ContentType::from_headers(headers) {
        ContentType::Json => Ok(serde_json::from_str(&text)?),
        ContentType::Form => {
            let field = form_payload_field(&text).ok_or(DecodeError::MissingFormPayload)?;
            Ok(serde_json::from_str(&field)?)
        }
        ContentType::Unspecified => match serde_json::from_str(&text) {
            Ok(payload) => Ok(payload),
            Err(json_err) => match form_payload_field(&text) {
                Some(field) => Ok(serde_json::from_str(&field)?),
                None => Err(json_err.into()),
            },
        },
    }
}

/// First non-empty `payload` value of a form body.
fn form_payload_field(body: &str) -> Option<String> {
    form_urlencoded::parse(body.as_bytes())
        .find(|(name, _)| name == FORM_PAYLOAD_FIELD)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
