mod common;

use common::{TestApp, TEST_KEY_SECRET, TEST_WEBHOOK_SECRET};
use serde_json::json;
use service_core::utils::signature::hmac_sha256_hex;

fn checkout_signature(order_id: &str, payment_id: &str) -> String {
    hmac_sha256_hex(TEST_KEY_SECRET, &format!("{}|{}", order_id, payment_id)).unwrap()
}

#[tokio::test]
async fn valid_signature_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/api/verify-payment",
            &json!({
                "razorpay_order_id": "order_abc",
                "razorpay_payment_id": "pay_xyz",
                "razorpay_signature": checkout_signature("order_abc", "pay_xyz")
            }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Payment verified successfully");
}

#[tokio::test]
async fn verification_is_repeatable() {
    let app = TestApp::spawn().await;
    let payload = json!({
        "razorpay_order_id": "order_abc",
        "razorpay_payment_id": "pay_xyz",
        "razorpay_signature": checkout_signature("order_abc", "pay_xyz")
    });

    for _ in 0..2 {
        let response = app.post_json("/api/verify-payment", &payload).await;
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let app = TestApp::spawn().await;
    let mut signature = checkout_signature("order_abc", "pay_xyz");
    let flipped = if signature.ends_with('0') { "1" } else { "0" };
    signature.replace_range(signature.len() - 1.., flipped);

    let response = app
        .post_json(
            "/api/verify-payment",
            &json!({
                "razorpay_order_id": "order_abc",
                "razorpay_payment_id": "pay_xyz",
                "razorpay_signature": signature
            }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "failure");
    assert_eq!(body["message"], "Invalid payment signature");
}

#[tokio::test]
async fn signature_for_another_payment_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/api/verify-payment",
            &json!({
                "razorpay_order_id": "order_abc",
                "razorpay_payment_id": "pay_other",
                "razorpay_signature": checkout_signature("order_abc", "pay_xyz")
            }),
        )
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/api/verify-payment",
            &json!({ "razorpay_order_id": "order_abc" }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "failure");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Missing required payment details"));
    assert!(message.contains("razorpay_payment_id"));
    assert!(message.contains("razorpay_signature"));
}

#[tokio::test]
async fn undecodable_bodies_fail_inside_the_verification_envelope() {
    let app = TestApp::spawn().await;
    let url = format!("{}/api/verify-payment", app.address);

    let requests = [
        app.client.post(&url).json(&json!({
            "razorpay_order_id": "order_abc",
            "razorpay_payment_id": "pay_xyz",
            "razorpay_signature": 123
        })),
        app.client
            .post(&url)
            .header("content-type", "application/json")
            .body("null"),
        app.client
            .post(&url)
            .header("content-type", "text/plain")
            .body("order_abc|pay_xyz"),
    ];

    for request in requests {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 400);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "failure");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Missing required payment details"));
        assert!(body.get("error").is_none());
    }
}

#[tokio::test]
async fn webhook_with_valid_signature_is_acknowledged() {
    let app = TestApp::spawn().await;
    let body = json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": "pay_xyz",
                    "amount": 117000,
                    "currency": "INR",
                    "status": "captured",
                    "order_id": "order_abc",
                    "method": "upi"
                }
            }
        }
    })
    .to_string();
    let signature = hmac_sha256_hex(TEST_WEBHOOK_SECRET, &body).unwrap();

    let response = app
        .client
        .post(format!("{}/webhooks/razorpay", app.address))
        .header("X-Razorpay-Signature", signature)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let app = TestApp::spawn().await;
    let body = json!({ "event": "payment.captured" }).to_string();

    let response = app
        .client
        .post(format!("{}/webhooks/razorpay", app.address))
        .header("X-Razorpay-Signature", "deadbeef")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn webhook_without_signature_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/webhooks/razorpay", app.address))
        .body(json!({ "event": "payment.captured" }).to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}
