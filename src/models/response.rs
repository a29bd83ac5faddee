use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookAction {
    Treat,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    Debounced,
}

/// Result of a debounced trigger attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TriggerOutcome {
    Triggered { response: Value },
    Skipped { reason: SkipReason },
}

impl TriggerOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, TriggerOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub received: bool,
    pub action: WebhookAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TriggerOutcome>,
}

impl WebhookResponse {
    pub fn ignored() -> Self {
        Self {
            received: true,
            action: WebhookAction::Ignored,
            result: None,
        }
    }

    pub fn treat(outcome: TriggerOutcome) -> Self {
        Self {
            received: true,
            action: WebhookAction::Treat,
            result: Some(outcome),
        }
    }
}
