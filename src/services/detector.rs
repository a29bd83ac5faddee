use crate::models::{EventPayload, TransactionRecord, TransferMatch};
use serde_json::Value;

/// Looks for native-currency transfers into the watched account.
#[derive(Debug, Clone)]
pub struct TransferDetector {
    watched_account: String,
}

impl TransferDetector {
    pub fn new(watched_account: impl Into<String>) -> Self {
        Self {
            watched_account: watched_account.into(),
        }
    }

    pub fn watched_account(&self) -> &str {
        &self.watched_account
    }

    /// Returns the first transfer of a positive amount to the watched
    /// account, scanning transactions in payload order.
    pub fn find_transfer(&self, body: &Value) -> Option<TransferMatch> {
        let payload = EventPayload::decode(body);

        payload.transactions().iter().find_map(|tx| {
            let record = TransactionRecord::decode(tx);
            record
                .native_transfers
                .iter()
                .find(|t| {
                    t.to_user_account.as_deref() == Some(self.watched_account.as_str())
                        && t.is_positive()
                })
                .map(|t| TransferMatch {
                    signature: record.signature.clone(),
                    from_user_account: t.from_user_account.clone(),
                    amount: t.amount.unwrap_or_default(),
                })
        })
    }

    pub fn includes_transfer(&self, body: &Value) -> bool {
        self.find_transfer(body).is_some()
    }
}
