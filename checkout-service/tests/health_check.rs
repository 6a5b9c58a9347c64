mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "checkout-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/ready").await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let app = TestApp::spawn().await;
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("http_requests_total"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn unusable_cors_origin_fails_startup() {
    let upstream = wiremock::MockServer::start().await;
    let mut config = common::test_config(&upstream.uri());
    config.cors.allowed_origins = vec!["https://shop.example.com\r\n".to_string()];

    assert!(checkout_service::Application::build(config).await.is_err());
}
