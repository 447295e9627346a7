use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::client::PaymentClient;
use crate::constants::{AGENT_ID_HEADER, DEFAULT_CLIENT_TIMEOUT};
use crate::error::ClientError;
use crate::types::{
    CompatibilityResult, CompletionAck, CompletionRequest, InitializationStatus, PaymentRequest,
    PaymentResult, PaymentVerification,
};

/// Connection settings for [`HttpPaymentClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the payment-agent API, e.g. `http://localhost:8001/api`.
    pub base_url: String,
    pub agent_id: String,
    /// Agent credential, sent as a bearer token.
    pub agent_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        agent_id: impl Into<String>,
        agent_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            agent_id: agent_id.into(),
            agent_key: agent_key.into(),
            timeout: DEFAULT_CLIENT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("agent_id", &self.agent_id)
            .field("agent_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`PaymentClient`] backed by the remote payment-agent HTTP API.
///
/// Built once at startup and shared across requests. Request timeouts are
/// enforced here, not by the orchestrator.
#[derive(Debug, Clone)]
pub struct HttpPaymentClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpPaymentClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        endpoint_url(&self.config.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AGENT_ID_HEADER, &self.config.agent_id)
            .bearer_auth(&self.config.agent_key)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body_bytes = serde_json::to_vec(body)?;
        let resp = self
            .authorized(self.http.post(self.endpoint(path)))
            .header("Content-Type", "application/json")
            .body(body_bytes)
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("POST {path} failed: {e}")))?;
        read_json(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .authorized(self.http.get(self.endpoint(path)))
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("GET {path} failed: {e}")))?;
        read_json(resp).await
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

impl PaymentClient for HttpPaymentClient {
    async fn check_website_compatibility(
        &self,
        url: &str,
    ) -> Result<CompatibilityResult, ClientError> {
        self.post_json(
            "agents/check-compatibility",
            &serde_json::json!({ "url": url }),
        )
        .await
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResult, ClientError> {
        self.post_json("payments/initiate", request).await
    }

    async fn check_initialization_status(
        &self,
        agent_payment_reference: &str,
    ) -> Result<InitializationStatus, ClientError> {
        let path = format!(
            "payments/initialization/{}",
            urlencoding::encode(agent_payment_reference)
        );
        self.get_json(&path).await
    }

    async fn complete_payment(&self, request: &CompletionRequest) -> Result<bool, ClientError> {
        let ack: CompletionAck = self.post_json("payments/complete", request).await?;
        Ok(ack.success)
    }

    async fn verify_payment(&self, payment_id: &str) -> Result<PaymentVerification, ClientError> {
        let path = format!("payments/verify/{}", urlencoding::encode(payment_id));
        self.get_json(&path).await
    }
}
