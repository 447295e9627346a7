use thiserror::Error;

/// Errors returned by a [`PaymentClient`](crate::PaymentClient).
///
/// Opaque to the orchestrator: none of them are retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(String),

    #[error("payment API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors returned by the [`Orchestrator`](crate::Orchestrator) flows.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Website not compatible")]
    IncompatibleSite,

    #[error("Merchant ID not found on the website")]
    MerchantIdMissing,

    #[error("invalid notification: {0}")]
    InvalidNotification(String),

    /// Carries the underlying client message verbatim.
    #[error("{0}")]
    PaymentInitiationFailed(String),

    /// Carries the underlying client message verbatim.
    #[error("{0}")]
    CompletionFailed(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl OrchestratorError {
    /// Policy rejections caused by the caller's input rather than a failing collaborator.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            OrchestratorError::IncompatibleSite
                | OrchestratorError::MerchantIdMissing
                | OrchestratorError::InvalidNotification(_)
        )
    }
}
