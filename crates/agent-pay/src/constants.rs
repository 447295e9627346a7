use std::time::Duration;

/// Webhook status that triggers payment completion.
pub const STATUS_INITIALIZED: &str = "initialized";

/// Delay before polling the initialization status of a referenced payment.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(1500);

/// Number of initialization-status polls in the reference flow.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 1;

/// Request timeout applied by [`crate::HttpPaymentClient`].
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the agent identity on payment API requests.
pub const AGENT_ID_HEADER: &str = "X-Agent-Id";

/// Header carrying the hex HMAC-SHA256 of a webhook body.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Webhook-Signature";
