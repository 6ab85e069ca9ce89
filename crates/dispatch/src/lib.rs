//! Webhook dispatch domain for PushGate.
//!
//! Turns one signed source-control push delivery into a set of downstream
//! pipeline starts. Everything with protocol or policy meaning lives here:
//! signature verification, payload decoding, changed-path extraction, the
//! ownership routing policy, per-pipeline trigger isolation, and the
//! request state machine that ties them together.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The pipeline service is reached through [`PipelineStarter`]; HTTP
//! transports for both inbound requests and outbound starts live in the
//! `listener` and `codepipeline` crates.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineName`, `ExecutionId`, `IdempotencyToken`) |
//! | [`types`] | Per-request value types (`ChangeSet`, `PipelineSelection`, `TriggerOutcome`, `DispatchResult`) |
//! | [`errors`] | Request-level, trigger, and configuration errors |
//! | [`headers`] | Case-insensitive header map and `InboundRequest` |
//! | [`signature`] | HMAC-SHA256 signature verification |
//! | [`decoder`] | JSON / form payload decoding |
//! | [`changes`] | Changed-path extraction |
//! | [`routing`] | Ownership table and routing policy |
//! | [`trigger`] | `PipelineStarter` port and `PipelineTrigger` |
//! | [`dispatcher`] | End-to-end request handling |

pub mod changes;
pub mod decoder;
pub mod dispatcher;
pub mod errors;
pub mod headers;
pub mod identifiers;
pub mod routing;
pub mod signature;
pub mod trigger;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use decoder::{CommitRecord, ContentType, PushPayload, Repository};
pub use dispatcher::{DispatchResponse, Dispatcher};
pub use errors::{DecodeError, DispatchError, RoutingConfigError, StartExecutionError};
pub use headers::{Headers, InboundRequest};
pub use identifiers::{DeliveryId, EmptyIdentifier, ExecutionId, IdempotencyToken, PipelineName};
pub use routing::{OwnershipRule, OwnershipTable};
pub use signature::WebhookSecret;
pub use trigger::{PipelineStarter, PipelineTrigger};
pub use types::{
    ChangeSet, DispatchResult, PipelineSelection, TriggerOutcome, WebhookEvent,
    CHANGED_FILES_SAMPLE_LIMIT,
};
