//! Shipment tracking through Shiprocket.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    services::{metrics, shiprocket::is_valid_awb},
    AppState,
};

/// `GET /api/track/:awb`
///
/// Relays Shiprocket's tracking document unchanged.
pub async fn track_shipment(
    State(state): State<AppState>,
    Path(awb): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let awb = awb.trim();
    if !is_valid_awb(awb) {
        metrics::record_tracking("rejected");
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid awb: must be an alphanumeric tracking number"
        )));
    }

    let tracking = state.shiprocket.track_awb(awb).await.map_err(|e| {
        metrics::record_tracking("gateway_error");
        AppError::GatewayError(e.to_string())
    })?;

    metrics::record_tracking("ok");
    tracing::debug!(awb = %awb, "Shipment tracking fetched");

    Ok(Json(tracking))
}
