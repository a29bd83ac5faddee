use serde_json::{json, Value};

/// Enhanced-transaction webhook body carrying one native transfer of
/// `lamports` from `payer` to `recipient`.
pub fn sample_transfer_payload(payer: &str, recipient: &str, lamports: u64) -> Value {
    json!({
        "events": [{
            "signature": format!("test-{}", uuid::Uuid::new_v4()),
            "type": "TRANSFER",
            "source": "SYSTEM_PROGRAM",
            "timestamp": chrono::Utc::now().timestamp(),
            "nativeTransfers": [{
                "fromUserAccount": payer,
                "toUserAccount": recipient,
                "amount": lamports,
            }],
        }]
    })
}
