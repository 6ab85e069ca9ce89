//! Test doubles shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dispatch::signature::{compute_signature, format_signature_header};
use dispatch::{
    Dispatcher, ExecutionId, IdempotencyToken, OwnershipTable, PipelineName, PipelineStarter,
    StartExecutionError, WebhookSecret,
};

pub const SECRET: &str = "listener-test-secret";

/// Succeeds for every pipeline and remembers which ones were started.
#[derive(Default)]
pub struct StubStarter {
    started: Mutex<Vec<String>>,
}

impl StubStarter {
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineStarter for StubStarter {
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
        _token: IdempotencyToken,
    ) -> Result<ExecutionId, StartExecutionError> {
        self.started.lock().unwrap().push(pipeline.to_string());
        Ok(ExecutionId::new(format!("exec-{pipeline}")).unwrap())
    }
}

pub fn dispatcher(starter: Arc<StubStarter>) -> Dispatcher {
    Dispatcher::new(WebhookSecret::new(SECRET), OwnershipTable::default(), starter)
}

pub fn sign(body: &[u8]) -> String {
    format_signature_header(&compute_signature(body, SECRET.as_bytes()).unwrap())
}

pub fn push_body(path: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "ref": "refs/heads/main",
        "before": "0000000",
        "after": "1111111",
        "repository": { "full_name": "octo/monorepo" },
        "commits": [{ "added": [path], "modified": [], "removed": [] }]
    }))
    .unwrap()
}
