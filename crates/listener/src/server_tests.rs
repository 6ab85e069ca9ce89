use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::test_support::{dispatcher, push_body, sign, StubStarter};

fn router(starter: Arc<StubStarter>) -> Router {
    build_router(Arc::new(dispatcher(starter)), "/webhook")
}

fn webhook_request(path: &str, event: &str, body: Vec<u8>, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header("x-github-delivery", "f2c1a6e0-0000-4000-8000-000000000001")
        .header("x-hub-signature-256", signature)
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ─── Health endpoint ───

#[tokio::test]
async fn health_returns_200_ok() {
    let app = router(Arc::new(StubStarter::default()));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ─── Webhook endpoint ───

#[tokio::test]
async fn ping_returns_pong_with_json_and_cors_headers() {
    let app = router(Arc::new(StubStarter::default()));
    let body = br#"{"zen":"Keep it logically awesome."}"#.to_vec();
    let signature = sign(&body);

    let response = app
        .oneshot(webhook_request("/webhook", "ping", body, &signature))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(body_json(response).await, serde_json::json!({ "message": "pong" }));
}

#[tokio::test]
async fn push_triggers_pipeline_and_returns_summary() {
    let starter = Arc::new(StubStarter::default());
    let app = router(starter.clone());
    let body = push_body("lambda1/handler.py");
    let signature = sign(&body);

    let response = app
        .oneshot(webhook_request("/webhook", "push", body, &signature))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["repo"], "octo/monorepo");
    assert_eq!(json["pipelines_triggered"], serde_json::json!(["lambda1-pipeline"]));
    assert_eq!(starter.started(), vec!["lambda1-pipeline"]);
}

#[tokio::test]
async fn invalid_signature_returns_401() {
    let starter = Arc::new(StubStarter::default());
    let app = router(starter.clone());
    let body = push_body("lambda1/handler.py");

    let response = app
        .oneshot(webhook_request("/webhook", "push", body, "sha256=deadbeef"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(body_json(response).await, serde_json::json!({ "error": "Invalid signature" }));
    assert!(starter.started().is_empty());
}

#[tokio::test]
async fn custom_webhook_path_is_served() {
    let app = build_router(Arc::new(dispatcher(Arc::new(StubStarter::default()))), "/hooks/github");
    let body = br#"{"zen":"Approachable is better than simple."}"#.to_vec();
    let signature = sign(&body);

    let response = app
        .oneshot(webhook_request("/hooks/github", "ping", body, &signature))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_on_webhook_path_is_method_not_allowed() {
    let app = router(Arc::new(StubStarter::default()));

    let request = Request::builder().uri("/webhook").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ─── Header conversion ───

#[test]
fn convert_headers_keeps_first_value_and_ignores_case() {
    let mut map = HeaderMap::new();
    map.append("X-GitHub-Event", "push".parse().unwrap());
    map.append("x-github-event", "ping".parse().unwrap());
    map.insert("Content-Type", "application/json".parse().unwrap());

    let headers = convert_headers(&map);

    assert_eq!(headers.get("X-GITHUB-EVENT"), Some("push"));
    assert_eq!(headers.get("content-type"), Some("application/json"));
    assert_eq!(headers.len(), 2);
}
