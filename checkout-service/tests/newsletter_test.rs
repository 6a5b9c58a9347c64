mod common;

use common::TestApp;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn subscriber_receives_welcome_email() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_partial_json(json!({ "to": ["reader@example.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_1" })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/newsletter/subscribe",
            &json!({ "email": "reader@example.com" }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Subscribed successfully");
    assert_eq!(body["id"], "email_1");
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    for payload in [json!({ "email": "not-an-email" }), json!({})] {
        let response = app.post_json("/api/newsletter/subscribe", &payload).await;
        assert_eq!(response.status(), 400, "{payload}");

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("email"));
    }
}

#[tokio::test]
async fn provider_failure_is_a_server_error() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "name": "internal_server_error",
            "message": "Something went wrong"
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/newsletter/subscribe",
            &json!({ "email": "reader@example.com" }),
        )
        .await;

    assert_eq!(response.status(), 500);
}
