//! Payment confirmation: checkout signature verification and Razorpay
//! webhooks.
//!
//! Neither handler records anything locally. Marking an order as paid is up
//! to the caller once verification succeeds.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{VerificationStatus, VerifyPaymentRequest, VerifyPaymentResponse},
    services::{metrics, verification::VerificationOutcome},
    AppState,
};

/// `POST /api/verify-payment`
///
/// Returns 200 `{status: "success"}` or 400 `{status: "failure"}`. Missing
/// fields and a bad signature share the status code but not the message.
///
/// The body is read leniently: an undecodable body or a non-string field
/// counts as a missing field, so every failure stays in the same envelope.
pub async fn verify_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<VerifyPaymentResponse>) {
    let payload = VerifyPaymentRequest::from_body(&body);
    let outcome = state.verifier.verify(&payload);
    metrics::record_verification(outcome.as_str());

    let order_id = payload.razorpay_order_id.as_deref().unwrap_or("-");
    let payment_id = payload.razorpay_payment_id.as_deref().unwrap_or("-");

    let message = match &outcome {
        VerificationOutcome::Verified => {
            tracing::info!(
                order_id = %order_id,
                payment_id = %payment_id,
                "Payment signature verified"
            );
            "Payment verified successfully".to_string()
        }
        VerificationOutcome::MissingFields(fields) => {
            tracing::warn!(missing = ?fields, "Payment verification request incomplete");
            format!("Missing required payment details: {}", fields.join(", "))
        }
        VerificationOutcome::SignatureMismatch => {
            tracing::warn!(
                order_id = %order_id,
                payment_id = %payment_id,
                "Payment signature verification failed"
            );
            "Invalid payment signature".to_string()
        }
        VerificationOutcome::NotConfigured => {
            tracing::error!(
                order_id = %order_id,
                "Razorpay key secret not configured; cannot verify payment"
            );
            "Invalid payment signature".to_string()
        }
    };

    let (status_code, status) = if outcome.is_verified() {
        (StatusCode::OK, VerificationStatus::Success)
    } else {
        (StatusCode::BAD_REQUEST, VerificationStatus::Failure)
    };

    (status_code, Json(VerifyPaymentResponse { status, message }))
}

/// `POST /webhooks/razorpay`
///
/// Verifies the signature before processing; acknowledges every
/// authentic event with 200.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get("X-Razorpay-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing X-Razorpay-Signature header");
            AppError::Unauthorized(anyhow::anyhow!("Missing webhook signature"))
        })?;

    let is_valid = state
        .razorpay
        .verify_webhook_signature(&body, signature)
        .map_err(|e| {
            tracing::error!(error = %e, "Webhook signature verification error");
            AppError::InternalError(anyhow::anyhow!("Webhook verification failed"))
        })?;

    if !is_valid {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid webhook signature"
        )));
    }

    let event = state.razorpay.parse_webhook_event(&body).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse webhook event");
        AppError::BadRequest(anyhow::anyhow!("Invalid webhook payload"))
    })?;

    match event.event.as_str() {
        "payment.captured" | "payment.failed" => {
            if let Some(payment) = event.payload.payment.as_ref().map(|p| &p.entity) {
                tracing::info!(
                    event_type = %event.event,
                    payment_id = %payment.id,
                    order_id = ?payment.order_id,
                    amount = payment.amount,
                    currency = %payment.currency,
                    status = %payment.status,
                    method = ?payment.method,
                    "Razorpay payment event received"
                );
            }
        }
        "order.paid" => {
            if let Some(order) = event.payload.order.as_ref().map(|o| &o.entity) {
                tracing::info!(
                    order_id = %order.id,
                    amount = order.amount,
                    receipt = ?order.receipt,
                    "Order paid webhook received"
                );
            }
        }
        _ => {
            tracing::debug!(event_type = %event.event, "Unhandled webhook event type");
        }
    }

    Ok(StatusCode::OK)
}
