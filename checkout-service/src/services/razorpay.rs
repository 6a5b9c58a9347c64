//! Razorpay payment provider client.
//!
//! Implements Razorpay's Orders API for payment initiation and
//! webhook signature checks. Checkout signature verification lives in
//! [`crate::services::verification`].

use crate::config::RazorpayConfig;
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::utils::signature::verify_hmac_sha256_hex;

/// Razorpay client for interacting with the Razorpay API.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

/// Request to create a Razorpay order.
#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in smallest currency unit (paise for INR).
    pub amount: u64,
    /// Currency code (e.g., "INR").
    pub currency: String,
    /// Merchant receipt id for reconciliation.
    pub receipt: String,
    /// 1 = capture automatically once the customer pays.
    pub payment_capture: u8,
    /// Notes for the order (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<serde_json::Value>,
}

/// Response from Razorpay order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    /// Razorpay order ID.
    pub id: String,
    /// Amount in smallest currency unit.
    pub amount: u64,
    /// Currency code.
    pub currency: String,
    /// Receipt ID.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Order status.
    #[serde(default)]
    pub status: Option<String>,
    /// Notes attached to the order.
    #[serde(default)]
    pub notes: Option<serde_json::Value>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<u64>,
}

/// Razorpay API error response.
#[derive(Debug, Deserialize)]
pub struct RazorpayError {
    pub error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Razorpay webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub payload: WebhookPayload,
    #[serde(default)]
    pub created_at: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<WebhookPaymentEntity>,
    pub order: Option<WebhookOrderEntity>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentEntity {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct WebhookOrderEntity {
    pub entity: RazorpayOrder,
}

/// Razorpay payment entity.
#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub order_id: Option<String>,
    pub method: Option<String>,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check if Razorpay is configured (credentials are set).
    pub fn is_configured(&self) -> bool {
        !self.config.key_id.is_empty() && !self.config.key_secret.expose_secret().is_empty()
    }

    /// Create a new order in Razorpay. Single attempt, no retry.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<RazorpayOrder> {
        if !self.is_configured() {
            return Err(anyhow!("Razorpay credentials not configured"));
        }

        let url = format!("{}/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Razorpay request failed: {}", e))?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Razorpay create_order response");

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&body)
                .map_err(|e| anyhow!("Unexpected Razorpay order response: {}", e))?;
            tracing::info!(
                order_id = %order.id,
                amount = order.amount,
                currency = %order.currency,
                "Razorpay order created"
            );
            Ok(order)
        } else {
            let error: RazorpayError =
                serde_json::from_str(&body).unwrap_or_else(|_| RazorpayError {
                    error: RazorpayErrorDetail {
                        code: format!("HTTP_{}", status.as_u16()),
                        description: body.chars().take(200).collect(),
                    },
                });
            tracing::error!(
                code = %error.error.code,
                description = %error.error.description,
                "Razorpay order creation failed"
            );
            Err(anyhow!(
                "Razorpay error: {} - {}",
                error.error.code,
                error.error.description
            ))
        }
    }

    /// Verify webhook signature.
    ///
    /// The signature is computed as:
    /// `HMAC-SHA256(request_body, webhook_secret)`
    pub fn verify_webhook_signature(&self, body: &str, signature: &str) -> Result<bool> {
        let secret = self.config.webhook_secret.expose_secret();
        if secret.is_empty() {
            tracing::error!("Razorpay webhook secret not configured; rejecting webhook");
            return Ok(false);
        }

        let is_valid = verify_hmac_sha256_hex(secret, body, signature)?;

        if !is_valid {
            tracing::warn!("Webhook signature verification failed");
        }

        Ok(is_valid)
    }

    /// Parse webhook event from request body.
    pub fn parse_webhook_event(&self, body: &str) -> Result<WebhookEvent> {
        let event: WebhookEvent = serde_json::from_str(body)?;
        Ok(event)
    }
}
