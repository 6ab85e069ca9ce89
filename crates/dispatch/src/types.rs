//! Value types produced while handling one webhook delivery.
//!
//! None of these outlive a single invocation; they are built when the request
//! arrives and dropped once the response has been emitted.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{ExecutionId, PipelineName};

/// Maximum number of changed paths echoed back in a push response.
pub const CHANGED_FILES_SAMPLE_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Event classification
// ---------------------------------------------------------------------------

/// The kind of delivery, read from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookEvent {
    /// Sent once when the webhook is registered.
    Ping,
    /// One or more commits were pushed.
    Push,
    /// Any other event type; acknowledged and ignored.
    Other(String),
}

impl WebhookEvent {
    /// Classifies an event header value. An absent header is `Other("unknown")`.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("ping") => Self::Ping,
            Some("push") => Self::Push,
            Some(other) if !other.is_empty() => Self::Other(other.to_string()),
            _ => Self::Other("unknown".to_string()),
        }
    }

    /// Returns the event type as it appeared on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => "ping",
            Self::Push => "push",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// Unique file paths touched by a push, always iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet(BTreeSet<String>);

impl ChangeSet {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path; returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates paths in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the first `limit` paths in sorted order.
    pub fn sample(&self, limit: usize) -> Vec<String> {
        self.0.iter().take(limit).cloned().collect()
    }

    /// Returns every path in sorted order.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Pipeline selection
// ---------------------------------------------------------------------------

/// The pipelines chosen for one push. Iteration order is sorted by name and is
/// also the order in which pipelines are triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSelection(BTreeSet<PipelineName>);

impl PipelineSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pipeline; returns `false` if it was already selected.
    pub fn insert(&mut self, pipeline: PipelineName) -> bool {
        self.0.insert(pipeline)
    }

    pub fn contains(&self, pipeline: &str) -> bool {
        self.0.iter().any(|p| p.as_str() == pipeline)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineName> {
        self.0.iter()
    }

    /// Pipeline names in selection order, as plain strings.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(PipelineName::as_str).collect()
    }
}

impl Extend<PipelineName> for PipelineSelection {
    fn extend<I: IntoIterator<Item = PipelineName>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<PipelineName> for PipelineSelection {
    fn from_iter<I: IntoIterator<Item = PipelineName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one start-execution attempt.
///
/// Exactly one of `execution_id` and `error` is present, selected by `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    pipeline: PipelineName,
    success: bool,
    #[serde(rename = "executionId", skip_serializing_if = "Option::is_none")]
    execution_id: Option<ExecutionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TriggerOutcome {
    pub fn succeeded(pipeline: PipelineName, execution_id: ExecutionId) -> Self {
        Self { pipeline, success: true, execution_id: Some(execution_id), error: None }
    }

    pub fn failed(pipeline: PipelineName, error: impl Into<String>) -> Self {
        Self { pipeline, success: false, execution_id: None, error: Some(error.into()) }
    }

    pub fn pipeline(&self) -> &PipelineName {
        &self.pipeline
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn execution_id(&self) -> Option<&ExecutionId> {
        self.execution_id.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Body of the 200 response to a push delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// Repository full name (`owner/name`), if the payload carried one.
    pub repo: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub changed_files_count: usize,
    /// At most [`CHANGED_FILES_SAMPLE_LIMIT`] paths, sorted.
    pub changed_files: Vec<String>,
    pub pipelines_triggered: PipelineSelection,
    /// One entry per selected pipeline, in selection order.
    pub trigger_results: Vec<TriggerOutcome>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
