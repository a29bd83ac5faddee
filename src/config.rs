use anyhow::{bail, Context, Result};
use reqwest::Method;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Watch target
    pub watched_account: String,

    // Outbound trigger
    pub trigger_url: String,
    pub trigger_method: Method,
    pub trigger_timeout: Duration,
    pub cooldown: Duration,

    // Inbound webhook
    pub webhook_path: String,
    pub webhook_secret: Option<String>,
    pub secret_header: String,
    pub auth_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Self::parse_environment(get("ENVIRONMENT"))?;

        let config = Self {
            environment,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            watched_account: get("PUBLIC_KEY_TO_WATCH")
                .context("PUBLIC_KEY_TO_WATCH required")?
                .trim()
                .to_string(),

            trigger_url: get("VSH_TRIGGER_URL").context("VSH_TRIGGER_URL required")?,
            trigger_method: Method::from_str(
                &get("TRIGGER_METHOD")
                    .unwrap_or_else(|| "GET".to_string())
                    .to_uppercase(),
            )
            .context("Invalid TRIGGER_METHOD")?,
            trigger_timeout: Duration::from_millis(
                get("TRIGGER_TIMEOUT_MS")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse()
                    .context("Invalid TRIGGER_TIMEOUT_MS")?,
            ),
            cooldown: Duration::from_millis(
                get("TREAT_COOLDOWN_MS")
                    .unwrap_or_else(|| "10000".to_string())
                    .parse()
                    .context("Invalid TREAT_COOLDOWN_MS")?,
            ),

            webhook_path: get("WEBHOOK_PATH").unwrap_or_else(|| "/helius".to_string()),
            webhook_secret: get("WEBHOOK_SECRET"),
            secret_header: get("WEBHOOK_SECRET_HEADER")
                .unwrap_or_else(|| DEFAULT_SECRET_HEADER.to_string())
                .to_lowercase(),
            auth_enabled: Self::parse_bool("WEBHOOK_AUTH_ENABLED", get("WEBHOOK_AUTH_ENABLED"), true)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(value: Option<String>) -> Result<Environment> {
        let env = value.unwrap_or_else(|| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool> {
        let Some(raw) = value else {
            return Ok(default);
        };

        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => bail!("Invalid {}: expected true/false, got {}", key, raw),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.watched_account.is_empty() {
            bail!("PUBLIC_KEY_TO_WATCH must not be empty");
        }
        if !self.trigger_url.starts_with("http") {
            bail!("VSH_TRIGGER_URL must be HTTP(S) URL");
        }
        if !self.webhook_path.starts_with('/') {
            bail!("WEBHOOK_PATH must start with /");
        }
        if self.webhook_path == "/" {
            bail!("WEBHOOK_PATH must not be the health check path");
        }
        if self.trigger_timeout.is_zero() {
            bail!("TRIGGER_TIMEOUT_MS must be greater than 0");
        }
        if axum::http::HeaderName::from_str(&self.secret_header).is_err() {
            bail!("WEBHOOK_SECRET_HEADER is not a valid header name");
        }

        if !self.auth_enabled {
            tracing::warn!("Webhook authentication is DISABLED; any caller can trigger a treat");
        } else if self.webhook_secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET is not set; every webhook request will be rejected");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
