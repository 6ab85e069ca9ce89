//! API-gateway proxy event adapter.
//!
//! An HTTP API gateway hands each request to the function as a JSON event:
//!
//! ```json
//! {
//!   "rawPath": "/webhook",
//!   "headers": { "x-github-event": "push", "...": "..." },
//!   "body": "<text or base64>",
//!   "isBase64Encoded": false,
//!   "requestContext": { "http": { "method": "POST" } }
//! }
//! ```
//!
//! and expects `{ "statusCode", "headers", "body" }` back. Version 1 events
//! (`path`, `httpMethod`) are accepted too.

use std::collections::BTreeMap;

use dispatch::{DispatchResponse, Dispatcher, Headers, InboundRequest};
use serde::{Deserialize, Serialize};

use crate::response::RESPONSE_HEADERS;

/// Inbound proxy event. Every field is optional; a missing body is empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    /// Kept sorted so that, of names differing only in case, the one that
    /// sorts first (`X-GitHub-Event` before `x-github-event`) wins.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

impl GatewayEvent {
    fn method(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .or(self.http_method.as_deref())
    }

    fn route_path(&self) -> Option<&str> {
        self.raw_path.as_deref().or(self.path.as_deref())
    }

    /// Converts the event into the dispatcher's request type.
    ///
    /// A base64-flagged body is passed through still encoded; the dispatcher
    /// decodes it before verifying the signature.
    pub fn into_inbound_request(self) -> InboundRequest {
        let route = match (self.method(), self.route_path()) {
            (Some(method), Some(path)) => Some((method.to_string(), path.to_string())),
            _ => None,
        };

        let headers: Headers = self.headers.unwrap_or_default().into_iter().collect();
        let body = self.body.unwrap_or_default().into_bytes();
        let request = if self.is_base64_encoded {
            InboundRequest::transport_encoded(headers, body)
        } else {
            InboundRequest::new(headers, body)
        };

        match route {
            Some((method, path)) => request.with_route(method, path),
            None => request,
        }
    }
}

/// Proxy response returned to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<DispatchResponse> for GatewayResponse {
    fn from(response: DispatchResponse) -> Self {
        Self {
            status_code: response.status(),
            headers: RESPONSE_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: response.body_string(),
        }
    }
}

/// Runs one proxy event through the dispatcher.
pub async fn handle_event(dispatcher: &Dispatcher, event: GatewayEvent) -> GatewayResponse {
    let request = event.into_inbound_request();
    dispatcher.dispatch(&request).await.into()
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
