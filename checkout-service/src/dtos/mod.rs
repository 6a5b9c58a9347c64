//! Wire types for the storefront API.
//!
//! Request fields are all optional; missing or out-of-range values are
//! reported by the validator as a 400 naming the field.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PricedCart;

/// One line of the submitted cart, untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Taken as a number so that `1.5` is reported as an invalid quantity.
    #[serde(default)]
    pub quantity: Option<f64>,
}

/// Body of `POST /api/create-order` and `POST /api/calculate-total`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemInput>,
    #[serde(default)]
    pub shipping_state: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// Gateway order id to open checkout with.
    pub order_id: String,
    /// Amount in minor units, as accepted by the gateway.
    pub amount: u64,
    pub currency: String,
    #[serde(rename = "calculatedTotal")]
    pub calculated_total: f64,
    pub breakdown: PricedCart,
}

#[derive(Debug, Serialize)]
pub struct PriceQuoteResponse {
    pub currency: String,
    pub amount: u64,
    pub breakdown: PricedCart,
}

/// Body of `POST /api/verify-payment`. Fields are optional here; a missing
/// one is a verification failure, not a decoding error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

impl VerifyPaymentRequest {
    /// Read the three fields from a raw request body. Anything that is not a
    /// JSON object, and any field that is not a string, comes back as `None`.
    pub fn from_body(body: &[u8]) -> Self {
        let value: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
        let field = |name: &str| value.get(name).and_then(|v| v.as_str()).map(str::to_string);

        Self {
            razorpay_order_id: field("razorpay_order_id"),
            razorpay_payment_id: field("razorpay_payment_id"),
            razorpay_signature: field("razorpay_signature"),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Success,
    Failure,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: VerificationStatus,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterSubscribeRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct NewsletterSubscribeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
