use std::io;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use agent_pay::{HttpPaymentClient, Orchestrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_pay_server::{cors::build_cors, routes, AppState, ServerConfig};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();

    tracing::info!("Starting agent-pay-server on port {}", port);
    tracing::info!("Agent: {}", config.agent_id);
    tracing::info!("Payment API: {}", config.payment_api_url);
    tracing::info!(
        "Polling: {} attempt(s) after {:?}",
        config.poll_attempts,
        config.poll_delay
    );
    tracing::info!(
        "Webhook signatures: {}",
        if config.webhook_secret.is_some() {
            "required"
        } else {
            "not checked (dev mode)"
        }
    );

    // One client for the whole process, shared by every request
    let client = HttpPaymentClient::new(config.client_config()).map_err(io::Error::other)?;
    let orchestrator = Orchestrator::new(client).with_poll_policy(config.poll_policy());
    let state = web::Data::new(AppState::new(orchestrator, &config));

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(config.rate_limit_rpm)
        .finish()
        .ok_or_else(|| io::Error::other("invalid rate limiter config"))?;

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(routes::json_config())
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure::<HttpPaymentClient>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
