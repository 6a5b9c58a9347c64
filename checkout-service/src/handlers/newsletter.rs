//! Newsletter sign-up.

use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::extract::ApiJson;
use validator::Validate;

use crate::{
    dtos::{NewsletterSubscribeRequest, NewsletterSubscribeResponse},
    services::metrics,
    AppState,
};

/// `POST /api/newsletter/subscribe`
#[tracing::instrument(skip(state, request))]
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewsletterSubscribeRequest>,
) -> Result<Json<NewsletterSubscribeResponse>, AppError> {
    request.validate().inspect_err(|_| metrics::record_subscription("rejected"))?;

    let id = state
        .resend
        .send_welcome(request.email.trim())
        .await
        .map_err(|e| {
            metrics::record_subscription("gateway_error");
            AppError::GatewayError(e.to_string())
        })?;

    metrics::record_subscription("subscribed");

    Ok(Json(NewsletterSubscribeResponse {
        message: "Subscribed successfully".to_string(),
        id: Some(id),
    }))
}
