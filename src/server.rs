//! Router assembly and service wiring.

use crate::{
    config::Config,
    error::RelayError,
    handlers::{health_check, receive_webhook, AppState},
    middleware::{webhook_auth_layer, WebhookAuth},
    services::{Debouncer, HttpTrigger, TransferDetector, TreatDispatcher, Trigger},
};
use anyhow::Result;
use axum::{
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

impl AppState {
    pub fn new(detector: TransferDetector, dispatcher: TreatDispatcher) -> Self {
        Self {
            detector: Arc::new(detector),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Builds the production services: HTTP trigger behind a system-clock
    /// debouncer.
    pub fn from_config(config: &Config) -> Result<Self> {
        let trigger: Arc<dyn Trigger> = Arc::new(HttpTrigger::new(
            config.trigger_url.clone(),
            config.trigger_method.clone(),
            config.trigger_timeout,
        )?);
        let debouncer = Arc::new(Debouncer::new(config.cooldown));

        Ok(Self::new(
            TransferDetector::new(config.watched_account.clone()),
            TreatDispatcher::new(debouncer, trigger),
        ))
    }
}

/// `GET /` health probe plus the authenticated `POST <webhook_path>`.
pub fn create_router(state: AppState, auth: Arc<WebhookAuth>, webhook_path: &str) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route(
            webhook_path,
            post(receive_webhook)
                .layer(axum_middleware::from_fn_with_state(auth, webhook_auth_layer)),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

pub fn create_router_from_config(config: &Config) -> Result<Router> {
    let state = AppState::from_config(config)?;
    let auth = Arc::new(WebhookAuth::from_config(config)?);
    Ok(create_router(state, auth, &config.webhook_path))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    RelayError::InternalError(detail).into_response()
}
