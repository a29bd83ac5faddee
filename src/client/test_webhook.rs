use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use treat_relay::client::sample::sample_transfer_payload;
use treat_relay::config::DEFAULT_SECRET_HEADER;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Load configuration
    dotenvy::dotenv().ok();

    let base_url = std::env::var("TREAT_RELAY_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let webhook_path = std::env::var("WEBHOOK_PATH").unwrap_or_else(|_| "/helius".to_string());
    let watched = std::env::var("PUBLIC_KEY_TO_WATCH").context("PUBLIC_KEY_TO_WATCH required")?;
    let secret = std::env::var("WEBHOOK_SECRET").ok();
    let header = std::env::var("WEBHOOK_SECRET_HEADER")
        .unwrap_or_else(|_| DEFAULT_SECRET_HEADER.to_string());
    let lamports: u64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .context("lamports argument must be an integer")?
        .unwrap_or(5000);

    println!("Treat Relay Test Webhook");
    println!("========================");
    println!("Relay: {}{}", base_url, webhook_path);
    println!("Watched account: {}", watched);
    println!("Amount: {} lamports", lamports);
    println!();

    let payload = sample_transfer_payload("TestPayer1111111111111111111111111111111111", &watched, lamports);

    let mut request = Client::new()
        .post(format!("{}{}", base_url, webhook_path))
        .json(&payload);
    match &secret {
        Some(secret) => request = request.header(header.as_str(), secret),
        None => println!("[WARN] WEBHOOK_SECRET not set, sending without secret header"),
    }

    let response = request.send().await.context("Failed to reach relay")?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        println!("[SUCCESS] {}", status);
    } else {
        println!("[FAILED] {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
