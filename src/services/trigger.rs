use crate::error::RelayError;
use crate::models::{SkipReason, TriggerOutcome};
use crate::services::Debouncer;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Downstream side effect fired when a watched transfer arrives.
#[async_trait]
pub trait Trigger: Send + Sync {
    async fn fire(&self) -> Result<Value, RelayError>;
}

pub struct HttpTrigger {
    client: reqwest::Client,
    url: String,
    method: Method,
}

impl HttpTrigger {
    pub fn new(url: String, method: Method, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("treat-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            method,
        })
    }
}

#[async_trait]
impl Trigger for HttpTrigger {
    async fn fire(&self) -> Result<Value, RelayError> {
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::TriggerFailed {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!("Trigger responded with {}", status);

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Runs the trigger at most once per debounce window.
pub struct TreatDispatcher {
    debouncer: Arc<Debouncer>,
    trigger: Arc<dyn Trigger>,
}

impl TreatDispatcher {
    pub fn new(debouncer: Arc<Debouncer>, trigger: Arc<dyn Trigger>) -> Self {
        Self { debouncer, trigger }
    }

    /// The permit is consumed before the call and is not returned on
    /// failure, so a failing device is not hammered on every webhook.
    pub async fn dispatch(&self) -> Result<TriggerOutcome, RelayError> {
        if !self.debouncer.try_acquire() {
            tracing::info!(
                remaining_ms = self.debouncer.remaining().as_millis() as u64,
                "Treat debounced"
            );
            return Ok(TriggerOutcome::Skipped {
                reason: SkipReason::Debounced,
            });
        }

        match self.trigger.fire().await {
            Ok(response) => {
                tracing::info!("Treat triggered");
                Ok(TriggerOutcome::Triggered { response })
            }
            Err(e) => {
                tracing::error!("Treat trigger failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn http_trigger(url: String, method: Method) -> Arc<dyn Trigger> {
        Arc::new(HttpTrigger::new(url, method, Duration::from_secs(5)).unwrap())
    }

    fn dispatcher(trigger: Arc<dyn Trigger>) -> (TreatDispatcher, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let debouncer = Arc::new(Debouncer::with_clock(
            Duration::from_secs(10),
            Arc::new(clock.clone()),
        ));
        (TreatDispatcher::new(debouncer, trigger), clock)
    }

    #[tokio::test]
    async fn json_response_is_parsed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/treat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"dispensed": 1}"#)
            .expect(1)
            .create_async()
            .await;

        let trigger = http_trigger(format!("{}/treat", server.url()), Method::GET);
        let body = assert_ok!(trigger.fire().await);

        assert_eq!(body, json!({"dispensed": 1}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_text_response_is_returned_as_is() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/treat")
            .with_status(200)
            .with_body("treat queued")
            .create_async()
            .await;

        let trigger = http_trigger(format!("{}/treat", server.url()), Method::POST);
        let body = assert_ok!(trigger.fire().await);

        assert_eq!(body, Value::String("treat queued".to_string()));
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/treat")
            .with_status(503)
            .with_body("hopper empty")
            .create_async()
            .await;

        let trigger = http_trigger(format!("{}/treat", server.url()), Method::GET);
        match trigger.fire().await {
            Err(RelayError::TriggerFailed { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "hopper empty");
            }
            other => panic!("expected TriggerFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_device_is_a_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let trigger = http_trigger("http://127.0.0.1:9/treat".to_string(), Method::GET);
        let err = assert_err!(trigger.fire().await);
        assert!(matches!(err, RelayError::TriggerTransport(_)));
    }

    #[tokio::test]
    async fn second_dispatch_inside_window_skips_the_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/treat")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (dispatcher, _clock) =
            dispatcher(http_trigger(format!("{}/treat", server.url()), Method::GET));

        let first = assert_ok!(dispatcher.dispatch().await);
        assert!(!first.is_skipped());

        let second = assert_ok!(dispatcher.dispatch().await);
        assert_eq!(
            second,
            TriggerOutcome::Skipped {
                reason: SkipReason::Debounced
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_trigger_still_consumes_the_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/treat")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let (dispatcher, clock) =
            dispatcher(http_trigger(format!("{}/treat", server.url()), Method::GET));

        assert_err!(dispatcher.dispatch().await);
        clock.advance_millis(5_000);
        assert!(assert_ok!(dispatcher.dispatch().await).is_skipped());
        mock.assert_async().await;
    }
}
