use crate::config::Config;
use crate::error::RelayError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Requests must carry `header` with a value equal to `secret`.
    SharedSecret {
        header: HeaderName,
        secret: Option<String>,
    },
    /// Every request is accepted.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct WebhookAuth {
    mode: AuthMode,
}

impl WebhookAuth {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    pub fn shared_secret(header: HeaderName, secret: Option<String>) -> Self {
        Self::new(AuthMode::SharedSecret { header, secret })
    }

    pub fn disabled() -> Self {
        Self::new(AuthMode::Disabled)
    }

    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        if !config.auth_enabled {
            return Ok(Self::disabled());
        }

        let header = HeaderName::from_str(&config.secret_header).map_err(|e| {
            RelayError::ConfigError(format!("invalid secret header {}: {}", config.secret_header, e))
        })?;
        Ok(Self::shared_secret(header, config.webhook_secret.clone()))
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        match &self.mode {
            AuthMode::Disabled => true,
            AuthMode::SharedSecret { header, secret } => {
                let Some(secret) = secret.as_deref().filter(|s| !s.is_empty()) else {
                    return false;
                };
                headers
                    .get(header)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|provided| !provided.is_empty() && provided == secret)
            }
        }
    }
}

pub async fn webhook_auth_layer(
    State(auth): State<Arc<WebhookAuth>>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    if !auth.authorize(request.headers()) {
        return Err(RelayError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    fn secured(secret: Option<&str>) -> WebhookAuth {
        WebhookAuth::shared_secret(
            HeaderName::from_static("x-webhook-secret"),
            secret.map(str::to_string),
        )
    }

    #[test]
    fn matching_secret_is_authorized() {
        assert!(secured(Some("s3cret")).authorize(&headers("x-webhook-secret", "s3cret")));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Webhook-Secret").unwrap(),
            HeaderValue::from_static("s3cret"),
        );
        assert!(secured(Some("s3cret")).authorize(&headers));
    }

    #[test]
    fn wrong_or_missing_header_is_rejected() {
        let auth = secured(Some("s3cret"));
        assert!(!auth.authorize(&HeaderMap::new()));
        assert!(!auth.authorize(&headers("x-webhook-secret", "guess")));
        assert!(!auth.authorize(&headers("x-webhook-secret", "S3CRET")));
        assert!(!auth.authorize(&headers("x-other-secret", "s3cret")));
    }

    #[test]
    fn unset_secret_rejects_everything() {
        assert!(!secured(None).authorize(&headers("x-webhook-secret", "")));
        assert!(!secured(Some("")).authorize(&headers("x-webhook-secret", "")));
        assert!(!secured(None).authorize(&HeaderMap::new()));
    }

    #[test]
    fn disabled_mode_accepts_anything() {
        assert!(WebhookAuth::disabled().authorize(&HeaderMap::new()));
    }
}
