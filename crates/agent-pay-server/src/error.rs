use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use agent_pay::OrchestratorError;

/// Errors surfaced by the HTTP routes as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// Body missing, malformed, or missing required fields
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Webhook signature missing or wrong
    #[error("{0}")]
    Unauthorized(&'static str),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Orchestrator(e) if e.is_client_fault() => StatusCode::BAD_REQUEST,
            ApiError::Orchestrator(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
