use std::sync::Mutex;

use async_trait::async_trait;
use dispatch::signature::{compute_signature, format_signature_header};
use dispatch::{ExecutionId, IdempotencyToken, PipelineName, StartExecutionError, WebhookSecret};
use serde_json::json;

use super::*;

const SECRET: &str = "replay-secret";

#[derive(Default)]
struct CountingStarter {
    started: Mutex<Vec<String>>,
}

#[async_trait]
impl PipelineStarter for CountingStarter {
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
        _token: IdempotencyToken,
    ) -> Result<ExecutionId, StartExecutionError> {
        self.started.lock().unwrap().push(pipeline.to_string());
        Ok(ExecutionId::new("exec-1").unwrap())
    }
}

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}

// ─── routes ───

#[test]
fn plan_routes_selects_owner_only() {
    let plan = plan_routes(&OwnershipTable::default(), &paths(&["lambda1/app.py", "README.md"]));

    assert_eq!(plan.changed_files, paths(&["README.md", "lambda1/app.py"]));
    assert!(plan.shared_paths.is_empty());
    assert_eq!(plan.pipelines, paths(&["lambda1-pipeline"]));
}

#[test]
fn plan_routes_reports_shared_fan_out() {
    let plan = plan_routes(&OwnershipTable::default(), &paths(&["layers/shared/python/db.py"]));

    assert_eq!(plan.shared_paths, paths(&["layers/shared/python/db.py"]));
    assert_eq!(plan.pipelines, paths(&["lambda1-pipeline", "lambda2-pipeline"]));
}

#[test]
fn plan_routes_serialises_as_json_report() {
    let plan = plan_routes(&OwnershipTable::default(), &paths(&["docs/index.md"]));

    assert_eq!(
        serde_json::to_value(&plan).unwrap(),
        json!({ "changed_files": ["docs/index.md"], "shared_paths": [], "pipelines": [] })
    );
}

// ─── replay ───

#[tokio::test]
async fn replay_event_runs_push_through_dispatcher() {
    let starter = Arc::new(CountingStarter::default());
    let dispatcher =
        Dispatcher::new(WebhookSecret::new(SECRET), OwnershipTable::default(), starter.clone());
    let body = json!({
        "ref": "refs/heads/main",
        "before": "a",
        "after": "b",
        "repository": { "full_name": "octo/monorepo" },
        "commits": [{ "added": [], "modified": ["lambda2/app.py"], "removed": [] }]
    })
    .to_string();
    let digest = compute_signature(body.as_bytes(), SECRET.as_bytes()).unwrap();
    let signature = format_signature_header(&digest);
    let event = json!({
        "rawPath": "/webhook",
        "requestContext": { "http": { "method": "POST" } },
        "headers": {
            "x-hub-signature-256": signature,
            "x-github-event": "push",
            "content-type": "application/json"
        },
        "body": body,
        "isBase64Encoded": false
    })
    .to_string();

    let response = replay_event(&dispatcher, &event).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(starter.started.lock().unwrap().as_slice(), ["lambda2-pipeline"]);
}

#[tokio::test]
async fn replay_event_rejects_non_event_input() {
    let dispatcher = Dispatcher::new(
        WebhookSecret::new(SECRET),
        OwnershipTable::default(),
        Arc::new(CountingStarter::default()),
    );

    let result = replay_event(&dispatcher, "[1, 2, 3]").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn dispatcher_without_secret_answers_500() {
    let dispatcher = build_dispatcher(&AppConfig::default(), Arc::new(CountingStarter::default()));

    let response = replay_event(&dispatcher, r#"{"body":"{}"}"#).await.unwrap();

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, r#"{"error":"Server misconfigured"}"#);
}

#[test]
fn read_event_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, r#"{"body":null}"#).unwrap();

    assert_eq!(read_event(&path).unwrap(), r#"{"body":null}"#);
}

#[test]
fn read_event_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(read_event(&dir.path().join("absent.json")).is_err());
}
