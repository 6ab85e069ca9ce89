//! Case-insensitive header map and the immutable inbound request.

use std::borrow::Cow;
use std::collections::HashMap;

use base64::Engine;

use crate::DecodeError;

/// Header carrying the `sha256=<hex>` body signature.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";
/// Header carrying the body media type.
pub const HEADER_CONTENT_TYPE: &str = "content-type";
/// Header carrying the event type (`push`, `ping`, ...).
pub const HEADER_EVENT: &str = "x-github-event";
/// Header carrying the unique delivery identifier.
pub const HEADER_DELIVERY: &str = "x-github-delivery";

/// Request headers with keys normalised to lower case once, at construction.
///
/// When the same name appears more than once (in any casing) the first value
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for (name, value) in iter {
            entries
                .entry(name.as_ref().to_ascii_lowercase())
                .or_insert_with(|| value.into());
        }
        Self { entries }
    }
}

/// One webhook delivery as handed over by the HTTP front door.
///
/// `body` holds the bytes exactly as received. When `transport_encoded` is set
/// they are base64 text and [`InboundRequest::raw_body`] decodes them; the
/// signature is always computed over the decoded bytes.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    headers: Headers,
    body: Vec<u8>,
    transport_encoded: bool,
    method: Option<String>,
    path: Option<String>,
}

impl InboundRequest {
    /// Creates a request whose body is already the raw payload.
    pub fn new(headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            body: body.into(),
            transport_encoded: false,
            method: None,
            path: None,
        }
    }

    /// Creates a request whose body is base64 text wrapping the raw payload.
    pub fn transport_encoded(headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        Self { transport_encoded: true, ..Self::new(headers, body) }
    }

    /// Attaches the HTTP method and path for request logging.
    pub fn with_route(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.path = Some(path.into());
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn is_transport_encoded(&self) -> bool {
        self.transport_encoded
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the payload bytes, undoing transport encoding if flagged.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Transport`] if a flagged body is not valid base64.
    pub fn raw_body(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        if self.transport_encoded {
            let decoded = base64::engine::general_purpose::STANDARD.decode(&self.body)?;
            Ok(Cow::Owned(decoded))
        } else {
            Ok(Cow::Borrowed(&self.body))
        }
    }
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;
