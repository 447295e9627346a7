use actix_web::{web, HttpResponse};
use agent_pay::{
    OrchestratorError, PaymentClient, PaymentOrder, PaymentVerification, ReferenceOutcome,
    ReferenceStatus,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompatibilityQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityResponse {
    pub compatible: bool,
}

fn failure_outcome(e: &OrchestratorError) -> &'static str {
    if e.is_client_fault() {
        "rejected"
    } else {
        "error"
    }
}

/// POST /check-compatibility - Check a website for payment-protocol support
pub async fn check_compatibility<C: PaymentClient + 'static>(
    state: web::Data<AppState<C>>,
    body: web::Json<CompatibilityQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .orchestrator
        .check_compatibility(&body.url)
        .await
        .map(|r| CompatibilityResponse {
            compatible: r.compatible,
        })
        .map_err(ApiError::from);
    super::respond("/check-compatibility", result)
}

/// POST /initiate-payment - Check the site, then initiate and relay the client's result
pub async fn initiate_payment<C: PaymentClient + 'static>(
    state: web::Data<AppState<C>>,
    body: web::Json<PaymentOrder>,
) -> Result<HttpResponse, ApiError> {
    let result = state.orchestrator.initiate_payment(&body).await;
    match &result {
        Ok(_) => metrics::record_payment("direct", "initiated"),
        Err(e) => metrics::record_payment("direct", failure_outcome(e)),
    }
    super::respond("/initiate-payment", result.map_err(ApiError::from))
}

/// POST /initiate-payment-agent-ref - Initiate with a correlation reference, poll, complete
pub async fn initiate_payment_agent_ref<C: PaymentClient + 'static>(
    state: web::Data<AppState<C>>,
    body: web::Json<PaymentOrder>,
) -> Result<HttpResponse, ApiError> {
    let result: Result<ReferenceOutcome, _> =
        state.orchestrator.initiate_payment_with_reference(&body).await;
    match &result {
        Ok(outcome) => {
            let label = match (&outcome.status, outcome.success) {
                (ReferenceStatus::Completed, true) => "completed",
                (ReferenceStatus::Completed, false) => "declined",
                (ReferenceStatus::Pending, _) => "pending",
                (ReferenceStatus::Other(_), _) => "other",
            };
            metrics::record_payment("reference", label);
        }
        Err(e) => metrics::record_payment("reference", failure_outcome(e)),
    }
    super::respond("/initiate-payment-agent-ref", result.map_err(ApiError::from))
}

/// GET /payments/{payment_id}/verify - Merchant-side verification record of a payment
pub async fn verify_payment<C: PaymentClient + 'static>(
    state: web::Data<AppState<C>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let payment_id = path.into_inner();
    let result: Result<PaymentVerification, ApiError> = state
        .orchestrator
        .verify_payment(&payment_id)
        .await
        .map_err(ApiError::from);
    super::respond("/payments/{payment_id}/verify", result)
}

pub fn configure<C: PaymentClient + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/check-compatibility",
        web::post().to(check_compatibility::<C>),
    )
    .route("/initiate-payment", web::post().to(initiate_payment::<C>))
    .route(
        "/initiate-payment-agent-ref",
        web::post().to(initiate_payment_agent_ref::<C>),
    )
    .route(
        "/payments/{payment_id}/verify",
        web::get().to(verify_payment::<C>),
    );
}
