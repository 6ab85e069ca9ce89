//! Error types for the dispatch domain.
//!
//! [`DispatchError`] covers the conditions that short-circuit a whole request
//! before any routing happens. Each variant maps to a distinct HTTP status and
//! a fixed public message; internal detail is logged, never returned.
//!
//! [`StartExecutionError`] is the per-pipeline trigger failure. It is never
//! propagated out of the dispatcher: the trigger converts it into a failed
//! [`crate::TriggerOutcome`] and moves on to the next pipeline.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Request-level errors
// ---------------------------------------------------------------------------

/// Errors that end request processing with a non-200 response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No webhook secret is configured. This is a server fault, not a client one.
    #[error("webhook secret is not configured")]
    Configuration,

    /// The signature header is absent, malformed, or does not match the body.
    #[error("webhook signature is missing or invalid")]
    Authentication,

    /// The body could not be decoded as JSON, directly or from a form field.
    #[error("payload could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

impl DispatchError {
    /// HTTP status code reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration => 500,
            Self::Authentication => 401,
            Self::Decode(_) => 400,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Configuration => "Server misconfigured",
            Self::Authentication => "Invalid signature",
            Self::Decode(_) => "Invalid payload",
        }
    }
}

/// Failure to turn request bytes into a JSON document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body (or the embedded form field) is not valid JSON.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A form-encoded body carried no non-empty `payload` field.
    #[error("form-encoded webhook missing 'payload' field")]
    MissingFormPayload,

    /// The body was flagged as base64 transport-encoded but is not valid base64.
    #[error("transport-encoded body is not valid base64: {0}")]
    Transport(#[from] base64::DecodeError),
}

// ---------------------------------------------------------------------------
// Trigger errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`crate::PipelineStarter`] for a single pipeline.
#[derive(Debug, Error)]
pub enum StartExecutionError {
    /// The service refused the caller's credentials or permissions.
    #[error("not authorized to start pipeline: {message}")]
    Unauthorized { message: String },

    /// The service rejected the call because of rate limiting.
    #[error("pipeline service throttled the request: {message}")]
    Throttled { message: String },

    /// The named pipeline does not exist.
    #[error("pipeline '{pipeline}' not found")]
    PipelineNotFound { pipeline: String },

    /// No response arrived within the request deadline.
    #[error("pipeline service did not respond within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The request could not be delivered (DNS, connect, TLS, reset).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Any other non-success response from the service.
    #[error("pipeline service returned status {status}: {message}")]
    Service { status: u16, message: String },

    /// The service answered with success but the body was unusable.
    #[error("invalid response from pipeline service: {message}")]
    InvalidResponse { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Problems found while validating an [`crate::OwnershipTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingConfigError {
    #[error("ownership rule has an empty path prefix")]
    EmptyPrefix,

    #[error("ownership rule for prefix '{prefix}' names no pipelines")]
    NoPipelines { prefix: String },

    #[error("shared prefix list contains an empty prefix")]
    EmptySharedPrefix,
}
