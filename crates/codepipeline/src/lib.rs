//! PushGate pipeline-service adapter.
//!
//! Implements the [`dispatch::PipelineStarter`] trait against the pipeline
//! execution service's HTTP API:
//!
//! ```text
//! POST {base_url}/pipelines/{name}/executions
//! {"clientRequestToken": "<uuid>"}
//!
//! 200 {"pipelineExecutionId": "<id>"}
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, the request deadline, and mapping of
//! status codes onto [`dispatch::StartExecutionError`] live here. The
//! [`dispatch`] crate sees only [`dispatch::PipelineStarter`].
//!
//! Every call makes exactly one request. Nothing is retried.

mod client;

pub use client::{HttpPipelineStarter, PipelineServiceConfig, PipelineServiceError};
