use actix_web::{web, HttpRequest, HttpResponse};
use agent_pay::{
    auth, CompletionAck, PaymentClient, WebhookNotification, WEBHOOK_SIGNATURE_HEADER,
};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Check the webhook HMAC when a secret is configured; without one every payload passes.
fn check_signature(
    req: &HttpRequest,
    body: &[u8],
    secret: Option<&[u8]>,
) -> Result<(), ApiError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    let header_value = req
        .headers()
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match header_value {
        Some(sig) if auth::verify_signature(secret, body, sig) => Ok(()),
        Some(_) => {
            tracing::warn!("webhook signature mismatch");
            Err(ApiError::Unauthorized("authentication failed"))
        }
        None => {
            tracing::warn!("webhook signature missing");
            Err(ApiError::Unauthorized("authentication required"))
        }
    }
}

async fn handle<C: PaymentClient>(
    req: &HttpRequest,
    state: &AppState<C>,
    body: &[u8],
) -> Result<CompletionAck, ApiError> {
    check_signature(req, body, state.webhook_secret.as_deref())?;

    let notification: WebhookNotification =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    metrics::record_webhook(&notification.status);

    let ack = state
        .orchestrator
        .handle_payment_webhook(&notification)
        .await?;
    if notification.is_initialized() {
        let outcome = if ack.success { "completed" } else { "declined" };
        metrics::record_payment("webhook", outcome);
    }
    Ok(ack)
}

/// POST /webhook/payment - Complete payments the merchant reports as initialized
pub async fn payment_webhook<C: PaymentClient + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<C>>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let result = handle(&req, &state, &body).await;
    super::respond("/webhook/payment", result)
}

pub fn configure<C: PaymentClient + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/payment", web::post().to(payment_webhook::<C>));
}
