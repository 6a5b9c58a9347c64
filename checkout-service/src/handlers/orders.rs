//! Cart pricing and gateway order creation.

use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::extract::ApiJson;

use crate::{
    dtos::{CreateOrderRequest, CreateOrderResponse, PriceQuoteResponse},
    models::PricedCart,
    services::{
        metrics, orders,
        pricing::{self, PricingError},
    },
    AppState,
};

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// Validate and price the submitted cart. Runs before any external call.
fn price_request(
    state: &AppState,
    payload: &CreateOrderRequest,
) -> Result<(PricedCart, String), PricingError> {
    let currency = pricing::resolve_currency(payload.currency.as_deref())?;
    let priced = pricing::price_cart(
        &payload.cart_items,
        payload.shipping_state.as_deref(),
        &state.pricing,
    )?;
    Ok((priced, currency))
}

/// `POST /api/create-order`
///
/// Prices the cart server-side and opens a Razorpay order for exactly that
/// amount. Any total the client computed is ignored.
#[tracing::instrument(skip_all, fields(items = payload.cart_items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let (priced, currency) = price_request(&state, &payload).map_err(|e| {
        tracing::warn!(error = %e, "Rejected cart");
        metrics::record_order("rejected");
        e
    })?;

    let order = orders::open_payment_order(
        &state.razorpay,
        &priced,
        &currency,
        payload.shipping_state.as_deref(),
    )
    .await?;

    tracing::info!(
        order_id = %order.id,
        amount = order.amount,
        total = priced.total,
        "Checkout order created"
    );

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        calculated_total: priced.total,
        breakdown: priced,
    }))
}

/// `POST /api/calculate-total`
///
/// Price preview. Same validation as `create-order`, no gateway call.
pub async fn calculate_total(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<PriceQuoteResponse>, AppError> {
    let (priced, currency) = price_request(&state, &payload)?;

    Ok(Json(PriceQuoteResponse {
        currency,
        amount: priced.amount_minor(),
        breakdown: priced,
    }))
}
