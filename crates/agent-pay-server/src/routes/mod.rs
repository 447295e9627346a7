//! HTTP routes. Handlers are generic over the [`PaymentClient`] so tests can
//! mount them on a scripted client.

use actix_web::{web, HttpResponse, ResponseError};
use agent_pay::PaymentClient;
use serde::Serialize;

use crate::error::ApiError;
use crate::metrics;

pub mod health;
pub mod payment;
pub mod webhook;

/// Mount every route for an [`AppState<C>`](crate::state::AppState).
pub fn configure<C: PaymentClient + 'static>(cfg: &mut web::ServiceConfig) {
    health::configure::<C>(cfg);
    payment::configure::<C>(cfg);
    webhook::configure::<C>(cfg);
}

/// JSON extractor config: 64KB bodies, malformed input answered as `{"error": ...}` with 400.
///
/// Rejected bodies never reach a handler, so they are counted here.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(65_536)
        .error_handler(|err, req| {
            let route = req.match_pattern();
            metrics::record_request(route.as_deref().unwrap_or(req.path()), 400);
            ApiError::BadRequest(err.to_string()).into()
        })
}

/// Serialize a handler result and count it against `route`.
fn respond<T: Serialize>(
    route: &'static str,
    result: Result<T, ApiError>,
) -> Result<HttpResponse, ApiError> {
    match result {
        Ok(body) => {
            metrics::record_request(route, 200);
            Ok(HttpResponse::Ok().json(body))
        }
        Err(e) => {
            metrics::record_request(route, e.status_code().as_u16());
            Err(e)
        }
    }
}
