//! Pipeline triggering through the [`PipelineStarter`] port.
//!
//! The port is implemented by infrastructure crates (see `codepipeline`) and
//! by test doubles. [`PipelineTrigger`] wraps it with the per-call token and
//! the failure isolation rule: a failed start is recorded, never propagated.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::{
    ExecutionId, IdempotencyToken, PipelineName, PipelineSelection, StartExecutionError,
    TriggerOutcome,
};

/// Starts executions on the downstream pipeline service.
///
/// Implementations make exactly one outbound call per invocation, perform no
/// retries, and bound the call with a deadline.
#[async_trait]
pub trait PipelineStarter: Send + Sync {
    /// Starts one execution of `pipeline`.
    ///
    /// # Errors
    ///
    /// Returns a [`StartExecutionError`] describing why the service did not
    /// start the execution.
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
        token: IdempotencyToken,
    ) -> Result<ExecutionId, StartExecutionError>;
}

/// Triggers pipelines and converts every result into a [`TriggerOutcome`].
#[derive(Clone)]
pub struct PipelineTrigger {
    starter: Arc<dyn PipelineStarter>,
}

impl PipelineTrigger {
    pub fn new(starter: Arc<dyn PipelineStarter>) -> Self {
        Self { starter }
    }

    /// Starts one execution of `pipeline` with a fresh idempotency token.
    ///
    /// Never fails: downstream errors become a failed outcome.
    #[instrument(skip(self), fields(pipeline = %pipeline))]
    pub async fn trigger(&self, pipeline: &PipelineName) -> TriggerOutcome {
        let token = IdempotencyToken::new_random();

        match self.starter.start_execution(pipeline, token).await {
            Ok(execution_id) => {
                info!(
                    pipeline = %pipeline,
                    execution_id = %execution_id,
                    "Pipeline triggered"
                );
                TriggerOutcome::succeeded(pipeline.clone(), execution_id)
            }
            Err(e) => {
                error!(pipeline = %pipeline, error = %e, "Failed to trigger pipeline");
                TriggerOutcome::failed(pipeline.clone(), e.to_string())
            }
        }
    }

    /// Triggers every selected pipeline one after another, in selection order.
    ///
    /// Returns exactly one outcome per pipeline, in the same order.
    pub async fn trigger_all(&self, selection: &PipelineSelection) -> Vec<TriggerOutcome> {
        let mut outcomes = Vec::with_capacity(selection.len());
        for pipeline in selection.iter() {
            outcomes.push(self.trigger(pipeline).await);
        }
        outcomes
    }
}

impl std::fmt::Debug for PipelineTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineTrigger").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
