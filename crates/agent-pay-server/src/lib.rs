//! HTTP surface for payment-agent orchestration.
//!
//! Exposes the [`agent_pay::Orchestrator`] flows as JSON routes on actix-web:
//! compatibility checks, direct and reference-based initiation, webhook-driven
//! completion, and payment verification.
//!
//! # Modules
//!
//! - [`config`]: Environment configuration ([`ServerConfig`](config::ServerConfig))
//! - [`routes`]: Route handlers and [`configure`](routes::configure)
//! - [`state`]: Shared [`AppState`](state::AppState)
//! - [`error`]: [`ApiError`](error::ApiError) to HTTP status mapping
//! - [`metrics`]: Prometheus counters for requests, payments and webhooks

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;
