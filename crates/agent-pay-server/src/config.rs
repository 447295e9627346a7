use std::env;
use std::time::Duration;

use agent_pay::{ClientConfig, PollPolicy, DEFAULT_CLIENT_TIMEOUT, DEFAULT_POLL_DELAY};
use url::Url;

const DEFAULT_PAYMENT_API_URL: &str = "http://localhost:8001/api";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RATE_LIMIT_RPM: u64 = 60;

#[derive(Clone)]
pub struct ServerConfig {
    /// Agent identity sent to the payment API
    pub agent_id: String,
    /// Agent credential for the payment API
    pub agent_private_key: String,
    /// Base URL of the payment-agent API
    pub payment_api_url: String,
    /// Request timeout enforced by the payment client
    pub payment_api_timeout: Duration,
    /// Server port
    pub port: u16,
    /// Delay before each initialization-status poll
    pub poll_delay: Duration,
    /// Initialization-status polls per reference-based payment
    pub poll_attempts: u32,
    /// HMAC secret for webhook signatures (None = webhooks unauthenticated)
    pub webhook_secret: Option<Vec<u8>>,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u64,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("agent_id", &self.agent_id)
            .field("agent_private_key", &"[REDACTED]")
            .field("payment_api_url", &self.payment_api_url)
            .field("payment_api_timeout", &self.payment_api_timeout)
            .field("port", &self.port)
            .field("poll_delay", &self.poll_delay)
            .field("poll_attempts", &self.poll_attempts)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Required: agent credentials
        let agent_id = get("AGENT_ID").ok_or(ConfigError::MissingRequired("AGENT_ID"))?;
        let agent_private_key =
            get("AGENT_PRIVATE_KEY").ok_or(ConfigError::MissingRequired("AGENT_PRIVATE_KEY"))?;

        let payment_api_url =
            get("PAYMENT_API_URL").unwrap_or_else(|| DEFAULT_PAYMENT_API_URL.to_string());
        let parsed = Url::parse(&payment_api_url)
            .map_err(|_| ConfigError::InvalidUrl(payment_api_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(payment_api_url));
        }

        let payment_api_timeout = get("PAYMENT_API_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CLIENT_TIMEOUT);

        let port = get("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let poll_delay = get("POLL_DELAY_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_DELAY);

        let poll_attempts = get("POLL_ATTEMPTS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);

        let webhook_secret = get("WEBHOOK_SECRET").map(String::into_bytes);

        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let rate_limit_rpm = get("RATE_LIMIT_RPM")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|rpm| *rpm > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let metrics_token = get("METRICS_TOKEN");

        if webhook_secret.is_none() {
            tracing::warn!(
                "WEBHOOK_SECRET not set: /webhook/payment accepts unsigned notifications. \
                 Put signature verification in front of it before exposing it publicly."
            );
        }
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set: /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            agent_id,
            agent_private_key,
            payment_api_url,
            payment_api_timeout,
            port,
            poll_delay,
            poll_attempts,
            webhook_secret,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            &self.payment_api_url,
            &self.agent_id,
            &self.agent_private_key,
        )
        .with_timeout(self.payment_api_timeout)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.poll_delay, self.poll_attempts)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
