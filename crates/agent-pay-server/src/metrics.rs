use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

pub static REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("agent_pay_requests_total", "Total HTTP requests"),
        &["route", "status"],
    )
    .unwrap()
});

pub static PAYMENTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("agent_pay_payments_total", "Payment flow outcomes"),
        &["flow", "outcome"],
    )
    .unwrap()
});

pub static WEBHOOKS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("agent_pay_webhooks_total", "Payment notifications received"),
        &["status"],
    )
    .unwrap()
});

/// Registry holding every metric above. Registration happens on first access.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::new();
    registry.register(Box::new(REQUESTS_TOTAL.clone())).unwrap();
    registry.register(Box::new(PAYMENTS_TOTAL.clone())).unwrap();
    registry.register(Box::new(WEBHOOKS_TOTAL.clone())).unwrap();
    registry
});

pub fn record_request(route: &str, status: u16) {
    let status = status.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[route, status.as_str()])
        .inc();
}

pub fn record_payment(flow: &str, outcome: &str) {
    PAYMENTS_TOTAL.with_label_values(&[flow, outcome]).inc();
}

/// Known webhook statuses keep their label; anything else is bucketed as "other".
pub fn record_webhook(status: &str) {
    let label = match status {
        "initialized" | "completed" | "pending" | "failed" => status,
        _ => "other",
    };
    WEBHOOKS_TOTAL.with_label_values(&[label]).inc();
}

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
