//! Payment-agent orchestration.
//!
//! Sequences calls to a remote payment-agent API: check a website for
//! payment-protocol support, initiate a payment with its merchant, and
//! complete the payment once the merchant reports it initialized (either by
//! webhook or by polling with a correlation reference).
//!
//! # Modules
//!
//! - [`types`]: request-scoped value types exchanged with the payment API
//! - [`client`]: the [`PaymentClient`] capability trait
//! - [`http_client`]: [`HttpPaymentClient`], the reqwest-backed implementation
//! - [`orchestrator`]: [`Orchestrator`], the four payment flows
//! - [`poll`]: [`PollPolicy`], the wait-then-check step of the reference flow
//! - [`auth`]: webhook HMAC signatures and constant-time token comparison
//!
//! # Quick example
//!
//! ```no_run
//! use agent_pay::{ClientConfig, HttpPaymentClient, Orchestrator};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = HttpPaymentClient::new(ClientConfig::new(
//!     "http://localhost:8001/api",
//!     "agent-1",
//!     "agent-key",
//! ))
//! .unwrap();
//! let orchestrator = Orchestrator::new(client);
//!
//! let result = orchestrator
//!     .check_compatibility("https://shop.example/cart")
//!     .await
//!     .unwrap();
//! println!("compatible: {}", result.compatible);
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod http_client;
pub mod orchestrator;
pub mod poll;
pub mod types;

pub use client::PaymentClient;
pub use constants::*;
pub use error::{ClientError, OrchestratorError};
pub use http_client::{ClientConfig, HttpPaymentClient};
pub use orchestrator::{generate_reference, Orchestrator};
pub use poll::PollPolicy;
pub use types::*;
