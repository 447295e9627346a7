use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::STATUS_INITIALIZED;

/// Response of the payment client's compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub compatible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

impl CompatibilityResult {
    pub fn supported(merchant_id: impl Into<String>) -> Self {
        Self {
            compatible: true,
            merchant_id: Some(merchant_id.into()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            compatible: false,
            merchant_id: None,
        }
    }

    /// The merchant id a payment may be addressed to.
    ///
    /// `None` when the site is incompatible, even if the check reported an id,
    /// and when the id is absent or empty.
    pub fn actionable_merchant_id(&self) -> Option<&str> {
        if !self.compatible {
            return None;
        }
        self.merchant_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Payment order as submitted by a caller: the target site plus what to pay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentOrder {
    pub url: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentOrder {
    /// Address this order to a resolved merchant.
    pub fn to_request(&self, merchant_id: &str, reference: Option<String>) -> PaymentRequest {
        PaymentRequest {
            merchant_id: merchant_id.to_string(),
            amount: self.amount,
            currency: self.currency.clone(),
            description: self.description.clone(),
            agent_payment_reference: reference,
        }
    }
}

/// Body of the payment client's initiate-payment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub merchant_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Correlation token for polling without a webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_payment_reference: Option<String>,
}

/// Whatever the payment client returns from initiate-payment, passed through untouched.
pub type PaymentResult = serde_json::Value;

/// Merchant-side initialization state of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InitializationState {
    Pending,
    Success,
    Other(String),
}

impl InitializationState {
    pub fn as_str(&self) -> &str {
        match self {
            InitializationState::Pending => "pending",
            InitializationState::Success => "success",
            InitializationState::Other(s) => s,
        }
    }
}

impl From<String> for InitializationState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => InitializationState::Pending,
            "success" => InitializationState::Success,
            _ => InitializationState::Other(s),
        }
    }
}

impl From<InitializationState> for String {
    fn from(state: InitializationState) -> Self {
        match state {
            InitializationState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Result of looking up a payment by its correlation reference.
///
/// The optional fields are only meaningful when `status` is
/// [`InitializationState::Success`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializationStatus {
    pub status: InitializationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl InitializationStatus {
    pub fn pending() -> Self {
        Self {
            status: InitializationState::Pending,
            payment_id: None,
            encrypted_advice: None,
            secret: None,
        }
    }

    pub fn success(
        payment_id: impl Into<String>,
        encrypted_advice: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            status: InitializationState::Success,
            payment_id: Some(payment_id.into()),
            encrypted_advice: Some(encrypted_advice.into()),
            secret: Some(secret.into()),
        }
    }
}

/// A required field was absent from a notification or status lookup.
///
/// Present-but-empty values are passed through to the merchant unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing field: {0}")]
pub struct MissingField(pub &'static str);

fn require(value: Option<&String>, field: &'static str) -> Result<String, MissingField> {
    value.cloned().ok_or(MissingField(field))
}

/// Everything the merchant needs to finalize a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub merchant_id: String,
    pub payment_id: String,
    pub encrypted_advice: String,
    pub secret: String,
}

impl CompletionRequest {
    pub fn from_initialization(
        merchant_id: &str,
        status: &InitializationStatus,
    ) -> Result<Self, MissingField> {
        Ok(Self {
            merchant_id: merchant_id.to_string(),
            payment_id: require(status.payment_id.as_ref(), "payment_id")?,
            encrypted_advice: require(status.encrypted_advice.as_ref(), "encrypted_advice")?,
            secret: require(status.secret.as_ref(), "secret")?,
        })
    }
}

/// `{success}` acknowledgement returned by completion and by the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionAck {
    pub success: bool,
}

/// Asynchronous payment notification pushed by the payment API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl WebhookNotification {
    pub fn is_initialized(&self) -> bool {
        self.status == STATUS_INITIALIZED
    }

    pub fn completion_request(&self) -> Result<CompletionRequest, MissingField> {
        Ok(CompletionRequest {
            merchant_id: require(self.merchant_id.as_ref(), "merchant_id")?,
            payment_id: require(self.payment_id.as_ref(), "payment_id")?,
            encrypted_advice: require(self.encrypted_advice.as_ref(), "encrypted_advice")?,
            secret: require(self.secret.as_ref(), "secret")?,
        })
    }
}

/// Merchant-side verification record of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub status: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Where a reference-based payment ended up when the orchestrator stopped polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReferenceStatus {
    /// Initialized by the merchant and completion was attempted.
    Completed,
    /// Still pending after the last poll.
    Pending,
    /// Any other merchant status, verbatim.
    Other(String),
}

impl From<String> for ReferenceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => ReferenceStatus::Completed,
            "pending" => ReferenceStatus::Pending,
            _ => ReferenceStatus::Other(s),
        }
    }
}

impl From<ReferenceStatus> for String {
    fn from(status: ReferenceStatus) -> Self {
        match status {
            ReferenceStatus::Completed => "completed".to_string(),
            ReferenceStatus::Pending => "pending".to_string(),
            ReferenceStatus::Other(s) => s,
        }
    }
}

/// Response of the reference-based flow.
///
/// `success` is `true` for anything short of a failed completion, so a pending
/// payment reads as success; `status` keeps the distinction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOutcome {
    pub success: bool,
    pub status: ReferenceStatus,
    pub reference: String,
}
