//! HTTP API tests against a fully wired in-memory server

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docfreq_config::DocfreqConfig;
use docfreq_core::DocumentId;
use docfreq_server::{Backends, Server};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

struct TestServer {
    app: Router,
    stop: oneshot::Sender<()>,
    serving: JoinHandle<Result<()>>,
}

impl TestServer {
    async fn start(config: DocfreqConfig) -> Result<Self> {
        let backends = Backends::in_memory(config.queue.max_fetch);
        let server = Server::with_backends(config, backends);
        let app = server.build_app();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let (stop, stopped) = oneshot::channel::<()>();
        let serving = tokio::spawn(server.serve(listener, async move {
            let _ = stopped.await;
        }));

        Ok(Self { app, stop, serving })
    }

    async fn post(&self, body: Value) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method("POST")
            .uri("/document")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?;
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    async fn shutdown(self) -> Result<()> {
        let _ = self.stop.send(());
        tokio::time::timeout(Duration::from_secs(5), self.serving).await???;
        Ok(())
    }
}

#[tokio::test]
async fn test_submit_document() -> Result<()> {
    let server = TestServer::start(DocfreqConfig::default()).await?;

    let (status, body) = server
        .post(json!({"document": "ABC 123 ABC", "duration_seconds": 0}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "DocumentID": DocumentId::for_document("ABC 123 ABC").as_str(),
            "Frequencies": [
                {"Word": "ABC", "Frequency": 2},
                {"Word": "123", "Frequency": 1}
            ]
        })
    );

    server.shutdown().await
}

#[tokio::test]
async fn test_repeat_submission_returns_same_report() -> Result<()> {
    let server = TestServer::start(DocfreqConfig::default()).await?;

    let (_, first) = server.post(json!({"document": "One two THREE"})).await?;
    let (status, second) = server.post(json!({"document": "One two THREE"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    server.shutdown().await
}

#[tokio::test]
async fn test_invalid_requests() -> Result<()> {
    let server = TestServer::start(DocfreqConfig::default()).await?;

    let (status, body) = server.post(json!({"document": ""})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"Error": "invalid document"}));

    let (status, body) = server
        .post(json!({"document": "x", "duration_seconds": 1, "extra": true}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["Error"].is_string());

    let (status, _) = server
        .post(json!({"document": "x", "duration_seconds": -1}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    server.shutdown().await
}

#[tokio::test]
async fn test_worker_disabled_times_out() -> Result<()> {
    let mut config = DocfreqConfig::default();
    config.worker.enabled = false;
    config.dispatch.request_timeout = Duration::from_millis(300);
    let server = TestServer::start(config).await?;

    let (status, body) = server.post(json!({"document": "no one is listening"})).await?;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["Error"].as_str().unwrap_or_default().contains("no result"));

    server.shutdown().await
}

#[tokio::test]
async fn test_slow_job_beyond_timeout() -> Result<()> {
    let mut config = DocfreqConfig::default();
    config.dispatch.request_timeout = Duration::from_millis(300);
    let server = TestServer::start(config).await?;

    let (status, _) = server
        .post(json!({"document": "slow", "duration_seconds": 5}))
        .await?;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    server.shutdown().await
}
