//! Conversion of dispatcher responses into HTTP responses.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use dispatch::DispatchResponse;

/// Headers attached to every dispatcher response, on both front doors.
pub const RESPONSE_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
];

/// Wraps a [`DispatchResponse`] so axum handlers can return it.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookReply(pub DispatchResponse);

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.0.body_string()).into_response();

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        response
    }
}
