//! End-to-end handling of one webhook delivery.
//!
//! Processing order:
//!
//! 1. Undo transport encoding (400 if the base64 is invalid).
//! 2. Require a configured secret (500 otherwise).
//! 3. Verify the signature over the raw body (401 otherwise).
//! 4. Decode the body as JSON (400 otherwise). Only push deliveries are
//!    then read as a push payload, leniently.
//! 5. Classify the event: `ping` answers `pong`, other non-push events are
//!    acknowledged, `push` continues.
//! 6. Extract changed paths, route them, trigger each selected pipeline.
//!
//! Steps 1–4 short-circuit before any routing or triggering. Trigger failures
//! never change the status of a push response.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::headers::{HEADER_CONTENT_TYPE, HEADER_DELIVERY, HEADER_EVENT};
use crate::{
    changes, decoder, routing, signature, DeliveryId, DispatchError, DispatchResult,
    InboundRequest, OwnershipTable, PipelineStarter, PipelineTrigger, PushPayload, WebhookEvent,
    WebhookSecret, CHANGED_FILES_SAMPLE_LIMIT,
};

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// HTTP-shaped result of a dispatch: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    status: u16,
    body: Value,
}

impl DispatchResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn from_error(err: &DispatchError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.public_message() }),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Body serialised as compact JSON text.
    pub fn body_string(&self) -> String {
        self.body.to_string()
    }
}

/// Successful end states of the dispatcher.
#[derive(Debug)]
enum Outcome {
    Pong,
    Acknowledged(String),
    Dispatched(DispatchResult),
}

impl Outcome {
    fn into_response(self) -> DispatchResponse {
        match self {
            Self::Pong => DispatchResponse::ok(json!({ "message": "pong" })),
            Self::Acknowledged(event_type) => {
                DispatchResponse::ok(json!({ "message": format!("event {event_type} received") }))
            }
            Self::Dispatched(result) => match serde_json::to_value(&result) {
                Ok(body) => DispatchResponse::ok(body),
                Err(e) => {
                    error!(error = %e, "Failed to serialise dispatch result");
                    DispatchResponse {
                        status: 500,
                        body: json!({ "error": "Internal error" }),
                    }
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Authenticates, decodes, routes, and triggers webhook deliveries.
///
/// Holds only immutable configuration and the pipeline starter, so one
/// instance can serve concurrent requests behind an [`Arc`].
#[derive(Debug)]
pub struct Dispatcher {
    secret: Option<WebhookSecret>,
    table: OwnershipTable,
    trigger: PipelineTrigger,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// A `None` secret is accepted so the server can start; every request is
    /// then answered with 500 until a secret is configured.
    pub fn new(
        secret: Option<WebhookSecret>,
        table: OwnershipTable,
        starter: Arc<dyn PipelineStarter>,
    ) -> Self {
        Self {
            secret,
            table,
            trigger: PipelineTrigger::new(starter),
        }
    }

    pub fn ownership_table(&self) -> &OwnershipTable {
        &self.table
    }

    /// Handles one delivery. Every failure is turned into a response.
    #[instrument(skip_all, fields(delivery = request.headers().get(HEADER_DELIVERY)))]
    pub async fn dispatch(&self, request: &InboundRequest) -> DispatchResponse {
        match self.process(request).await {
            Ok(outcome) => outcome.into_response(),
            Err(err) => {
                match &err {
                    DispatchError::Configuration => {
                        error!("Missing webhook secret configuration");
                    }
                    DispatchError::Authentication => {
                        warn!("Signature verification failed");
                    }
                    DispatchError::Decode(e) => {
                        warn!(error = %e, "Invalid payload");
                    }
                }
                DispatchResponse::from_error(&err)
            }
        }
    }

    async fn process(&self, request: &InboundRequest) -> Result<Outcome, DispatchError> {
        let headers = request.headers();
        let raw_body = request.raw_body()?;

        info!(
            method = request.method().unwrap_or("-"),
            path = request.path().unwrap_or("-"),
            body_len = raw_body.len(),
            content_type = headers.get(HEADER_CONTENT_TYPE).unwrap_or("-"),
            "Webhook request received"
        );

        let secret = self.secret.as_ref().ok_or(DispatchError::Configuration)?;
        if !signature::verify(headers, &raw_body, secret) {
            return Err(DispatchError::Authentication);
        }

        let payload = decoder::decode(headers, &raw_body)?;

        let event = WebhookEvent::from_header(headers.get(HEADER_EVENT));
        let delivery = headers.get(HEADER_DELIVERY).and_then(DeliveryId::new);
        info!(
            github_event = %event,
            delivery = delivery.as_ref().map_or("unknown", DeliveryId::as_str),
            "Webhook authenticated"
        );

        match event {
            WebhookEvent::Ping => Ok(Outcome::Pong),
            WebhookEvent::Other(event_type) => {
                info!(event_type = %event_type, "Ignoring non-push event");
                Ok(Outcome::Acknowledged(event_type))
            }
            WebhookEvent::Push => {
                let push = PushPayload::from_value(&payload);
                Ok(Outcome::Dispatched(self.handle_push(push).await))
            }
        }
    }

    async fn handle_push(&self, payload: PushPayload) -> DispatchResult {
        let changed = changes::extract(&payload);
        let sample = changed.sample(CHANGED_FILES_SAMPLE_LIMIT);

        info!(
            repo = payload.repository_name().unwrap_or("-"),
            git_ref = payload.git_ref.as_deref().unwrap_or("-"),
            before = payload.before.as_deref().unwrap_or("-"),
            after = payload.after.as_deref().unwrap_or("-"),
            changed_files_count = changed.len(),
            changed_files_sample = ?sample,
            "Push received"
        );

        let selection = routing::route(&changed, &self.table);
        info!(pipelines = ?selection.names(), "Determined pipelines to trigger");

        let trigger_results = self.trigger.trigger_all(&selection).await;

        DispatchResult {
            repo: payload.repository_name().map(str::to_string),
            git_ref: payload.git_ref,
            before: payload.before,
            after: payload.after,
            changed_files_count: changed.len(),
            changed_files: sample,
            pipelines_triggered: selection,
            trigger_results,
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
