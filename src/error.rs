use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("Malformed webhook body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Treat trigger failed: {status} {body}")]
    TriggerFailed { status: u16, body: String },

    #[error("Treat trigger unreachable: {0}")]
    TriggerTransport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    pub request_id: String,
    pub timestamp: chrono::DateTime<Utc>,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RelayError::TriggerFailed { .. } | RelayError::TriggerTransport(_) => {
                StatusCode::BAD_GATEWAY
            }
            RelayError::ConfigError(_) | RelayError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RelayError::Unauthorized => "UNAUTHORIZED",
            RelayError::MalformedBody(_) => "MALFORMED_BODY",
            RelayError::TriggerFailed { .. } => "TRIGGER_FAILED",
            RelayError::TriggerTransport(_) => "TRIGGER_UNREACHABLE",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message returned to the caller. Internal failures are reported
    /// generically; their details only reach the log.
    fn public_message(&self) -> String {
        match self {
            RelayError::ConfigError(_) | RelayError::InternalError(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let error_code = self.error_code();

        let body = ErrorResponse {
            error: self.public_message(),
            error_code: error_code.to_string(),
            request_id: request_id.clone(),
            timestamp: Utc::now(),
        };

        match &self {
            RelayError::Unauthorized => tracing::warn!(
                request_id = %request_id,
                "Rejected webhook with missing or invalid secret"
            ),
            RelayError::MalformedBody(_) => tracing::warn!(
                error = %self,
                request_id = %request_id,
                "Rejected malformed webhook body"
            ),
            _ => tracing::error!(
                error = ?self,
                error_code = error_code,
                request_id = %request_id,
                "Request failed"
            ),
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let response = RelayError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["error_code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn trigger_failure_maps_to_bad_gateway_with_detail() {
        let err = RelayError::TriggerFailed {
            status: 503,
            body: "device offline".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Treat trigger failed: 503 device offline");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response = RelayError::InternalError("db password is hunter2".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal server error");
        assert!(!body.to_string().contains("hunter2"));
    }
}
