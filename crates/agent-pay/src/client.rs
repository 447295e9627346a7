//! Capability interface of the remote payment-agent API.
//!
//! The orchestrator only ever talks to a [`PaymentClient`]; signing, merchant
//! negotiation and persistence live behind it. See
//! [`crate::http_client::HttpPaymentClient`] for the HTTP implementation.

use crate::error::ClientError;
use crate::types::{
    CompatibilityResult, CompletionRequest, InitializationStatus, PaymentRequest, PaymentResult,
    PaymentVerification,
};

/// Payment-agent API. Every call may perform network I/O and fail with a
/// transport or protocol error.
pub trait PaymentClient: Send + Sync {
    /// Check whether `url` speaks the payment protocol and, if so, which merchant it belongs to.
    fn check_website_compatibility(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<CompatibilityResult, ClientError>> + Send;

    /// Ask the merchant to initialize a payment.
    fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> impl std::future::Future<Output = Result<PaymentResult, ClientError>> + Send;

    /// Look up a payment by the agent's correlation reference.
    fn check_initialization_status(
        &self,
        agent_payment_reference: &str,
    ) -> impl std::future::Future<Output = Result<InitializationStatus, ClientError>> + Send;

    /// Finalize an initialized payment. Returns whether the merchant accepted it.
    fn complete_payment(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<bool, ClientError>> + Send;

    /// Fetch the merchant-side verification record of a payment.
    fn verify_payment(
        &self,
        payment_id: &str,
    ) -> impl std::future::Future<Output = Result<PaymentVerification, ClientError>> + Send;
}
