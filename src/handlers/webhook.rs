use crate::{
    error::RelayError,
    models::WebhookResponse,
    services::{TransferDetector, TreatDispatcher},
};
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<TransferDetector>,
    pub dispatcher: Arc<TreatDispatcher>,
}

/// Handles a transaction notification. The body is parsed as JSON whatever
/// content type the provider declares; an empty body counts as no events.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, RelayError> {
    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };

    let Some(transfer) = state.detector.find_transfer(&payload) else {
        tracing::debug!("No transfer to {} in webhook", state.detector.watched_account());
        return Ok(Json(WebhookResponse::ignored()));
    };

    tracing::info!(
        signature = transfer.signature.as_deref().unwrap_or("unknown"),
        from = transfer.from_user_account.as_deref().unwrap_or("unknown"),
        amount = transfer.amount,
        "Incoming transfer to watched account"
    );

    let outcome = state.dispatcher.dispatch().await?;

    Ok(Json(WebhookResponse::treat(outcome)))
}
