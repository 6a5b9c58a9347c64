//! Opening gateway orders for priced carts.

use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;

use crate::models::PricedCart;
use crate::services::metrics;
use crate::services::razorpay::{CreateOrderRequest, RazorpayClient, RazorpayOrder};

/// Unique merchant receipt derived from the current time.
pub fn generate_receipt() -> String {
    format!("receipt_{}", Utc::now().timestamp_micros())
}

/// Order notes carried by the gateway for audit. Razorpay stores note values
/// as strings.
pub fn audit_notes(priced: &PricedCart, shipping_state: Option<&str>) -> serde_json::Value {
    let mut notes = json!({
        "subtotal": priced.subtotal.to_string(),
        "shippingCost": priced.shipping_cost.to_string(),
        "tax": priced.tax.to_string(),
        "total": priced.total.to_string(),
        "itemCount": priced.item_count.to_string(),
    });

    // Present whenever the state took part in shipping classification.
    if let Some(state) = shipping_state.filter(|s| !s.is_empty()) {
        notes["shippingState"] = json!(state.trim());
    }

    notes
}

/// Open an auto-capture gateway order for `priced`.
///
/// The amount is always `priced.amount_minor()`. A gateway that answers
/// with a different amount or currency is treated as a failure.
pub async fn open_payment_order(
    razorpay: &RazorpayClient,
    priced: &PricedCart,
    currency: &str,
    shipping_state: Option<&str>,
) -> Result<RazorpayOrder, AppError> {
    let request = CreateOrderRequest {
        amount: priced.amount_minor(),
        currency: currency.to_string(),
        receipt: generate_receipt(),
        payment_capture: 1,
        notes: Some(audit_notes(priced, shipping_state)),
    };

    tracing::info!(
        amount = request.amount,
        currency = %request.currency,
        receipt = %request.receipt,
        "Opening Razorpay order"
    );

    let order = razorpay.create_order(&request).await.map_err(|e| {
        metrics::record_order("gateway_error");
        AppError::GatewayError(e.to_string())
    })?;

    if order.amount != request.amount || !order.currency.eq_ignore_ascii_case(&request.currency) {
        tracing::error!(
            order_id = %order.id,
            requested_amount = request.amount,
            gateway_amount = order.amount,
            requested_currency = %request.currency,
            gateway_currency = %order.currency,
            "Gateway order does not match requested amount"
        );
        metrics::record_order("amount_mismatch");
        return Err(AppError::GatewayError(
            "Payment gateway returned an order with a mismatched amount".to_string(),
        ));
    }

    metrics::record_order("created");
    metrics::record_amount(&order.currency, order.amount);

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced() -> PricedCart {
        PricedCart {
            subtotal: 1000.0,
            shipping_cost: 70.0,
            tax: 100.0,
            total: 1170.0,
            item_count: 1,
        }
    }

    #[test]
    fn notes_carry_the_breakdown() {
        let notes = audit_notes(&priced(), Some(" Tamil Nadu "));

        assert_eq!(notes["subtotal"], "1000");
        assert_eq!(notes["shippingCost"], "70");
        assert_eq!(notes["tax"], "100");
        assert_eq!(notes["total"], "1170");
        assert_eq!(notes["itemCount"], "1");
        assert_eq!(notes["shippingState"], "Tamil Nadu");
    }

    #[test]
    fn notes_omit_absent_state() {
        assert!(audit_notes(&priced(), None).get("shippingState").is_none());
        assert!(audit_notes(&priced(), Some("")).get("shippingState").is_none());
    }

    #[test]
    fn notes_keep_whitespace_state() {
        let notes = audit_notes(&priced(), Some("   "));
        assert_eq!(notes["shippingState"], "");
    }

    #[test]
    fn receipts_are_prefixed() {
        assert!(generate_receipt().starts_with("receipt_"));
    }
}
