//! HTTP client tests against a mock cost report endpoint.

use std::time::Duration;

use costbar_core::{FixedClock, ReportWindow, WindowPolicy};
use costbar_fetch::{
    API_VERSION, ApiKey, COST_REPORT_ENDPOINT, CostError, CostReportRequest, CostSource,
    ErrorKind, HttpCostClient,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request_for(base_url: &str) -> CostReportRequest {
    let clock = FixedClock::parse("2025-03-03T09:30:00+00:00").unwrap();
    let window = ReportWindow::from_clock(WindowPolicy::RecentUtcDays, &clock);
    let key = ApiKey::new("sk-ant-admin-test").unwrap();
    CostReportRequest::build(base_url, &key, &window).unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    let body = json!({
        "data": [{
            "starting_at": "2025-03-02T00:00:00Z",
            "ending_at": "2025-03-03T00:00:00Z",
            "results": [{"amount": "1234.5", "model": "claude-opus-4-6"}]
        }],
        "has_more": false,
        "next_page": null
    });

    Mock::given(method("GET"))
        .and(path(COST_REPORT_ENDPOINT))
        .and(query_param("starting_at", "2025-03-01T00:00:00Z"))
        .and(query_param("ending_at", "2025-03-03T09:30:00Z"))
        .and(query_param("bucket_width", "1d"))
        .and(query_param("group_by[]", "description"))
        .and(header("x-api-key", "sk-ant-admin-test"))
        .and(header("anthropic-version", API_VERSION))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpCostClient::new().unwrap();
    let document = client.fetch(&request_for(&server.uri())).await.unwrap();

    assert_eq!(document, body);
}

#[tokio::test]
async fn test_unauthorized_json_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COST_REPORT_ENDPOINT))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid key"}})),
        )
        .mount(&server)
        .await;

    let client = HttpCostClient::new().unwrap();
    let err = client.fetch(&request_for(&server.uri())).await.unwrap_err();

    match err {
        CostError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid key");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_plain_body() {
    let server = MockServer::start().await;
    let body = format!("<html>{}</html>", "Bad Gateway ".repeat(30));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let client = HttpCostClient::new().unwrap();
    let err = client.fetch(&request_for(&server.uri())).await.unwrap_err();

    let CostError::Upstream { status, message } = err else {
        panic!("expected upstream error");
    };
    assert_eq!(status, 502);
    assert_eq!(message, body.chars().take(120).collect::<String>());
}

#[tokio::test]
async fn test_malformed_json_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = HttpCostClient::new().unwrap();
    let err = client.fetch(&request_for(&server.uri())).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unexpected);
}

#[tokio::test]
async fn test_timeout_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = HttpCostClient::with_timeout(Duration::from_millis(200)).unwrap();
    let err = client.fetch(&request_for(&server.uri())).await.unwrap_err();

    assert!(matches!(err, CostError::Timeout(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Network error: request timed out after 200ms");
}

#[tokio::test]
async fn test_truncated_body_is_transport() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Promise 100 bytes, send 10, then hang up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"data\": [")
            .await;
        let _ = socket.shutdown().await;
    });

    let client = HttpCostClient::with_timeout(Duration::from_secs(5)).unwrap();
    let err = client
        .fetch(&request_for(&format!("http://{addr}")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    // Bind then drop a server so the port is known to be closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let client = HttpCostClient::with_timeout(Duration::from_secs(2)).unwrap();
    let err = client.fetch(&request_for(&uri)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().starts_with("Network error:"));
}
