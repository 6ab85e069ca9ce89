//! Test doubles shared by the unit tests of this crate.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ExecutionId, IdempotencyToken, PipelineName, PipelineStarter, StartExecutionError};

/// Records every start call; pipelines listed in `failing` answer with a
/// throttling error, all others succeed with `exec-<pipeline>`.
#[derive(Default)]
pub struct RecordingStarter {
    failing: HashSet<String>,
    calls: Mutex<Vec<(PipelineName, IdempotencyToken)>>,
}

impl RecordingStarter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(pipelines: &[&str]) -> Self {
        Self {
            failing: pipelines.iter().map(|p| p.to_string()).collect(),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<(PipelineName, IdempotencyToken)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_pipelines(&self) -> Vec<String> {
        self.calls().into_iter().map(|(p, _)| p.to_string()).collect()
    }
}

#[async_trait]
impl PipelineStarter for RecordingStarter {
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
        token: IdempotencyToken,
    ) -> Result<ExecutionId, StartExecutionError> {
        self.calls.lock().unwrap().push((pipeline.clone(), token));
        if self.failing.contains(pipeline.as_str()) {
            return Err(StartExecutionError::Throttled { message: "Rate exceeded".to_string() });
        }
        Ok(ExecutionId::new(format!("exec-{pipeline}")).unwrap())
    }
}
