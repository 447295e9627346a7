use agent_pay::{Orchestrator, PaymentClient};

use crate::config::ServerConfig;

/// Shared application state, built once at startup and handed to every request.
pub struct AppState<C> {
    pub orchestrator: Orchestrator<C>,
    /// HMAC secret for `/webhook/payment` signatures (None = unsigned webhooks accepted)
    pub webhook_secret: Option<Vec<u8>>,
    /// Bearer token for `/metrics` (None = public)
    pub metrics_token: Option<String>,
}

impl<C: PaymentClient> AppState<C> {
    pub fn new(orchestrator: Orchestrator<C>, config: &ServerConfig) -> Self {
        Self {
            orchestrator,
            webhook_secret: config.webhook_secret.clone(),
            metrics_token: config.metrics_token.clone(),
        }
    }

    /// State without webhook or metrics authentication.
    pub fn open(orchestrator: Orchestrator<C>) -> Self {
        Self {
            orchestrator,
            webhook_secret: None,
            metrics_token: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    pub fn with_metrics_token(mut self, token: impl Into<String>) -> Self {
        self.metrics_token = Some(token.into());
        self
    }
}
