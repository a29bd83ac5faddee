//! Typed view over the loosely structured webhook bodies sent by the
//! transaction monitoring provider.
//!
//! Decoding here never fails: shapes that are not recognised collapse to an
//! empty transaction list or an absent field, which downstream detection
//! treats as "no match".

use serde_json::Value;

/// Accepted top-level shapes of a webhook body.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// The body is itself an array of transactions.
    Batch(Vec<Value>),
    /// The body is an object carrying an `events` or `transactions` list.
    Envelope(Vec<Value>),
    /// Anything else.
    Unrecognized,
}

impl EventPayload {
    pub fn decode(body: &Value) -> Self {
        match body {
            Value::Array(txs) => EventPayload::Batch(txs.clone()),
            Value::Object(map) => {
                let list = ["events", "transactions"]
                    .iter()
                    .find_map(|key| map.get(*key).filter(|v| !v.is_null()));

                match list {
                    Some(Value::Array(txs)) => EventPayload::Envelope(txs.clone()),
                    _ => EventPayload::Unrecognized,
                }
            }
            _ => EventPayload::Unrecognized,
        }
    }

    pub fn transactions(&self) -> &[Value] {
        match self {
            EventPayload::Batch(txs) | EventPayload::Envelope(txs) => txs,
            EventPayload::Unrecognized => &[],
        }
    }
}

/// A single native-currency movement inside a transaction record.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTransfer {
    pub to_user_account: Option<String>,
    pub from_user_account: Option<String>,
    /// Amount in the chain's smallest unit; `None` when no usable
    /// `amount`/`lamports` field was present.
    pub amount: Option<f64>,
}

impl NativeTransfer {
    pub fn decode(record: &Value) -> Self {
        Self {
            to_user_account: record.get("toUserAccount").and_then(stringify),
            from_user_account: record.get("fromUserAccount").and_then(stringify),
            amount: Self::decode_amount(record),
        }
    }

    /// `amount` wins unless it is missing, zero or unusable, in which case
    /// `lamports` is consulted.
    fn decode_amount(record: &Value) -> Option<f64> {
        let amount = record.get("amount").and_then(numeric);
        match amount {
            Some(a) if a != 0.0 => Some(a),
            _ => record.get("lamports").and_then(numeric).or(amount),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }
}

/// Transaction record reduced to the parts the relay inspects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub signature: Option<String>,
    pub native_transfers: Vec<NativeTransfer>,
}

impl TransactionRecord {
    pub fn decode(tx: &Value) -> Self {
        let transfers = ["nativeTransfers", "solTransfers"]
            .iter()
            .find_map(|key| tx.get(*key).and_then(Value::as_array))
            .map(|list| list.iter().map(NativeTransfer::decode).collect())
            .unwrap_or_default();

        Self {
            signature: tx.get("signature").and_then(Value::as_str).map(str::to_string),
            native_transfers: transfers,
        }
    }
}

/// The first transfer that satisfied the watch condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferMatch {
    pub signature: Option<String>,
    pub from_user_account: Option<String>,
    pub amount: f64,
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
