//! The payment flows.
//!
//! Every flow is a straight sequence of [`PaymentClient`] calls; nothing is
//! retried and nothing is rolled back. The orchestrator keeps no per-request
//! state, so one instance is shared by all in-flight requests.

use crate::client::PaymentClient;
use crate::error::{ClientError, OrchestratorError};
use crate::poll::PollPolicy;
use crate::types::{
    CompatibilityResult, CompletionAck, CompletionRequest, InitializationState,
    InitializationStatus, PaymentOrder, PaymentResult, PaymentVerification, ReferenceOutcome,
    ReferenceStatus, WebhookNotification,
};

/// Fresh correlation reference: a random (v4) UUID rendered as text.
pub fn generate_reference() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub struct Orchestrator<C> {
    client: C,
    poll: PollPolicy,
}

impl<C: PaymentClient> Orchestrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub async fn check_compatibility(
        &self,
        url: &str,
    ) -> Result<CompatibilityResult, OrchestratorError> {
        Ok(self.client.check_website_compatibility(url).await?)
    }

    /// Resolve the merchant behind `url`, rejecting sites that cannot be paid.
    async fn resolve_merchant(&self, url: &str) -> Result<String, OrchestratorError> {
        let compatibility = self.check_compatibility(url).await?;
        if !compatibility.compatible {
            tracing::warn!(url = %url, "website not compatible");
            return Err(OrchestratorError::IncompatibleSite);
        }
        match compatibility.actionable_merchant_id() {
            Some(id) => Ok(id.to_string()),
            None => {
                tracing::warn!(url = %url, "compatible website exposes no merchant id");
                Err(OrchestratorError::MerchantIdMissing)
            }
        }
    }

    /// Check the site, then initiate and return the client's result as-is.
    pub async fn initiate_payment(
        &self,
        order: &PaymentOrder,
    ) -> Result<PaymentResult, OrchestratorError> {
        let merchant_id = self.resolve_merchant(&order.url).await?;
        let request = order.to_request(&merchant_id, None);

        tracing::info!(
            merchant_id = %merchant_id,
            amount = %order.amount,
            currency = %order.currency,
            "initiating payment"
        );

        self.client.initiate_payment(&request).await.map_err(|e| {
            tracing::error!(merchant_id = %merchant_id, error = %e, "payment initiation failed");
            OrchestratorError::PaymentInitiationFailed(e.to_string())
        })
    }

    /// Complete the payment when the notification says it was initialized.
    ///
    /// Any other status is acknowledged with `{success: true}` and no client call.
    pub async fn handle_payment_webhook(
        &self,
        notification: &WebhookNotification,
    ) -> Result<CompletionAck, OrchestratorError> {
        if !notification.is_initialized() {
            tracing::info!(
                status = %notification.status,
                payment_id = ?notification.payment_id,
                "payment notification acknowledged"
            );
            return Ok(CompletionAck { success: true });
        }

        let request = notification
            .completion_request()
            .map_err(|e| OrchestratorError::InvalidNotification(e.to_string()))?;

        tracing::info!(
            merchant_id = %request.merchant_id,
            payment_id = %request.payment_id,
            "completing payment from webhook"
        );

        let success = self.complete(&request).await?;
        Ok(CompletionAck { success })
    }

    /// Initiate with a correlation reference, wait, poll, and complete if initialized.
    ///
    /// Initiation's own result is discarded. A payment still pending after the
    /// last poll is reported with `success: true` and status `pending`.
    pub async fn initiate_payment_with_reference(
        &self,
        order: &PaymentOrder,
    ) -> Result<ReferenceOutcome, OrchestratorError> {
        let merchant_id = self.resolve_merchant(&order.url).await?;
        let reference = generate_reference();
        let request = order.to_request(&merchant_id, Some(reference.clone()));

        tracing::info!(
            merchant_id = %merchant_id,
            reference = %reference,
            "initiating payment with agent reference"
        );

        self.client
            .initiate_payment(&request)
            .await
            .map_err(|e| initiation_failed(&reference, e))?;

        let client = &self.client;
        let lookup = reference.as_str();
        let status = self
            .poll
            .wait_for(
                move || client.check_initialization_status(lookup),
                |s: &InitializationStatus| s.status == InitializationState::Pending,
            )
            .await
            .map_err(|e| initiation_failed(&reference, e))?;

        let outcome = match status.status {
            InitializationState::Success => {
                let completion = CompletionRequest::from_initialization(&merchant_id, &status)
                    .map_err(|e| OrchestratorError::CompletionFailed(e.to_string()))?;
                let success = self.complete(&completion).await?;
                ReferenceOutcome {
                    success,
                    status: ReferenceStatus::Completed,
                    reference,
                }
            }
            InitializationState::Pending => {
                tracing::info!(reference = %reference, "payment still pending after polling");
                ReferenceOutcome {
                    success: true,
                    status: ReferenceStatus::Pending,
                    reference,
                }
            }
            InitializationState::Other(other) => {
                tracing::warn!(reference = %reference, status = %other, "unexpected initialization status");
                ReferenceOutcome {
                    success: true,
                    status: ReferenceStatus::Other(other),
                    reference,
                }
            }
        };
        Ok(outcome)
    }

    /// Look up the merchant's verification record for a payment.
    pub async fn verify_payment(
        &self,
        payment_id: &str,
    ) -> Result<PaymentVerification, OrchestratorError> {
        Ok(self.client.verify_payment(payment_id).await?)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<bool, OrchestratorError> {
        let success = self.client.complete_payment(request).await.map_err(|e| {
            tracing::error!(payment_id = %request.payment_id, error = %e, "payment completion failed");
            OrchestratorError::CompletionFailed(e.to_string())
        })?;
        if success {
            tracing::info!(payment_id = %request.payment_id, "payment completed");
        } else {
            tracing::warn!(payment_id = %request.payment_id, "merchant declined completion");
        }
        Ok(success)
    }
}

fn initiation_failed(reference: &str, e: ClientError) -> OrchestratorError {
    tracing::error!(reference = %reference, error = %e, "reference payment failed");
    OrchestratorError::PaymentInitiationFailed(e.to_string())
}
