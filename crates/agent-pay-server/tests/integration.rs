use std::sync::Mutex;
use std::time::Duration;

use actix_web::{test, web, App};
use agent_pay::{
    auth, ClientError, CompatibilityResult, CompletionRequest, InitializationStatus,
    Orchestrator, PaymentClient, PaymentRequest, PaymentResult, PaymentVerification, PollPolicy,
};
use rust_decimal::Decimal;

use agent_pay_server::{metrics, routes, AppState};

/// Scripted payment client: fixed answers, every call recorded.
struct MockClient {
    compatibility: CompatibilityResult,
    status: InitializationStatus,
    complete_result: bool,
    fail_initiate: bool,
    compatibility_urls: Mutex<Vec<String>>,
    initiated: Mutex<Vec<PaymentRequest>>,
    completed: Mutex<Vec<CompletionRequest>>,
}

impl MockClient {
    fn compatible(merchant_id: &str) -> Self {
        Self {
            compatibility: CompatibilityResult::supported(merchant_id),
            status: InitializationStatus::pending(),
            complete_result: true,
            fail_initiate: false,
            compatibility_urls: Mutex::new(Vec::new()),
            initiated: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    fn incompatible() -> Self {
        Self {
            compatibility: CompatibilityResult::unsupported(),
            ..Self::compatible("unused")
        }
    }
}

impl PaymentClient for MockClient {
    async fn check_website_compatibility(
        &self,
        url: &str,
    ) -> Result<CompatibilityResult, ClientError> {
        self.compatibility_urls.lock().unwrap().push(url.to_string());
        Ok(self.compatibility.clone())
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResult, ClientError> {
        self.initiated.lock().unwrap().push(request.clone());
        if self.fail_initiate {
            return Err(ClientError::Status {
                status: 503,
                body: "merchant busy".into(),
            });
        }
        Ok(serde_json::json!({
            "payment_id": "p-1",
            "status": "initiated",
            "merchant_id": request.merchant_id,
        }))
    }

    async fn check_initialization_status(
        &self,
        _agent_payment_reference: &str,
    ) -> Result<InitializationStatus, ClientError> {
        Ok(self.status.clone())
    }

    async fn complete_payment(&self, request: &CompletionRequest) -> Result<bool, ClientError> {
        self.completed.lock().unwrap().push(request.clone());
        Ok(self.complete_result)
    }

    async fn verify_payment(&self, payment_id: &str) -> Result<PaymentVerification, ClientError> {
        Ok(PaymentVerification {
            status: "successful".into(),
            timestamp: "2024-05-01T12:00:00Z".into(),
            secret: Some(format!("secret-for-{payment_id}")),
        })
    }
}

fn make_state(client: MockClient) -> web::Data<AppState<MockClient>> {
    let orchestrator =
        Orchestrator::new(client).with_poll_policy(PollPolicy::new(Duration::ZERO, 1));
    web::Data::new(AppState::open(orchestrator))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(routes::json_config())
                .configure(routes::configure::<MockClient>),
        )
        .await
    };
}

fn order_body(url: &str) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "amount": 12.5,
        "currency": "USD",
        "description": "two coffees",
    })
}

fn initialized_webhook() -> serde_json::Value {
    serde_json::json!({
        "status": "initialized",
        "merchant_id": "m-1",
        "payment_id": "p-9",
        "encrypted_advice": "...",
        "secret": "s",
    })
}

#[actix_rt::test]
async fn test_check_compatibility_returns_flag_only() {
    let state = make_state(MockClient::compatible("m-42"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/check-compatibility")
        .set_json(serde_json::json!({ "url": "http://shop.example/cart" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "compatible": true }));
    assert_eq!(
        *state.orchestrator.client().compatibility_urls.lock().unwrap(),
        vec!["http://shop.example/cart".to_string()]
    );
}

#[actix_rt::test]
async fn test_check_compatibility_requires_url() {
    let state = make_state(MockClient::compatible("m-42"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/check-compatibility")
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("url"));
}

#[actix_rt::test]
async fn test_initiate_payment_relays_client_result() {
    let state = make_state(MockClient::compatible("m-42"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment")
        .set_json(order_body("http://shop.example/cart"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["payment_id"], "p-1");
    assert_eq!(body["merchant_id"], "m-42");

    let initiated = state.orchestrator.client().initiated.lock().unwrap();
    assert_eq!(initiated.len(), 1);
    assert_eq!(initiated[0].merchant_id, "m-42");
    assert_eq!(initiated[0].amount, Decimal::new(125, 1));
    assert_eq!(initiated[0].currency, "USD");
    assert_eq!(initiated[0].description.as_deref(), Some("two coffees"));
}

#[actix_rt::test]
async fn test_initiate_payment_incompatible_site() {
    let state = make_state(MockClient::incompatible());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment")
        .set_json(order_body("http://bad.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "error": "Website not compatible" }));

    let client = state.orchestrator.client();
    assert!(client.initiated.lock().unwrap().is_empty());
    assert!(client.completed.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_initiate_payment_missing_merchant_id() {
    let state = make_state(MockClient {
        compatibility: CompatibilityResult {
            compatible: true,
            merchant_id: None,
        },
        ..MockClient::compatible("unused")
    });
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment")
        .set_json(order_body("http://shop.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Merchant ID not found on the website");
    assert!(state.orchestrator.client().initiated.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_initiate_payment_client_failure_is_500() {
    let state = make_state(MockClient {
        fail_initiate: true,
        ..MockClient::compatible("m-42")
    });
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment")
        .set_json(order_body("http://shop.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "payment API returned 503: merchant busy");
}

#[actix_rt::test]
async fn test_webhook_initialized_completes_payment() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .set_json(initialized_webhook())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "success": true }));

    let completed = state.orchestrator.client().completed.lock().unwrap();
    assert_eq!(
        *completed,
        vec![CompletionRequest {
            merchant_id: "m-1".into(),
            payment_id: "p-9".into(),
            encrypted_advice: "...".into(),
            secret: "s".into(),
        }]
    );
}

#[actix_rt::test]
async fn test_webhook_other_status_is_acknowledged() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .set_json(serde_json::json!({ "status": "completed", "payment_id": "p-9" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "success": true }));
    assert!(state.orchestrator.client().completed.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_webhook_initialized_missing_fields_is_400() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .set_json(serde_json::json!({ "status": "initialized", "merchant_id": "m-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert!(state.orchestrator.client().completed.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_webhook_signature_enforced_when_secret_set() {
    let orchestrator = Orchestrator::new(MockClient::compatible("m-1"));
    let state = web::Data::new(AppState::open(orchestrator).with_webhook_secret("whsec"));
    let app = app!(state);
    let payload = serde_json::to_vec(&initialized_webhook()).unwrap();

    // Missing signature
    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(payload.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authentication required");

    // Wrong signature
    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Webhook-Signature", "deadbeef"))
        .set_payload(payload.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert!(state.orchestrator.client().completed.lock().unwrap().is_empty());

    // Valid signature
    let sig = auth::sign_payload(b"whsec", &payload);
    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Webhook-Signature", sig))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(state.orchestrator.client().completed.lock().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_reference_flow_pending_reports_success() {
    let state = make_state(MockClient::compatible("m-7"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment-agent-ref")
        .set_json(order_body("http://shop.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "pending");

    let client = state.orchestrator.client();
    let initiated = client.initiated.lock().unwrap();
    assert_eq!(
        initiated[0].agent_payment_reference.as_deref(),
        body["reference"].as_str()
    );
    assert!(client.completed.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_reference_flow_completes_when_initialized() {
    let state = make_state(MockClient {
        status: InitializationStatus::success("p-3", "advice", "sec"),
        complete_result: false,
        ..MockClient::compatible("m-7")
    });
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment-agent-ref")
        .set_json(order_body("http://shop.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "completed");

    let completed = state.orchestrator.client().completed.lock().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].merchant_id, "m-7");
    assert_eq!(completed[0].payment_id, "p-3");
}

#[actix_rt::test]
async fn test_reference_flow_incompatible_site() {
    let state = make_state(MockClient::incompatible());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/initiate-payment-agent-ref")
        .set_json(order_body("http://bad.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Website not compatible");
}

#[actix_rt::test]
async fn test_verify_payment_route() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/payments/p-77/verify")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "successful");
    assert_eq!(body["secret"], "secret-for-p-77");
}

#[actix_rt::test]
async fn test_health() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "agent-pay-server");
}

#[actix_rt::test]
async fn test_metrics_requires_token_when_configured() {
    let orchestrator = Orchestrator::new(MockClient::compatible("m-1"));
    let state = web::Data::new(AppState::open(orchestrator).with_metrics_token("metrics-tok"));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer metrics-tok"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn test_malformed_body_is_counted() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);
    let counter = || {
        metrics::REQUESTS_TOTAL
            .with_label_values(&["/initiate-payment", "400"])
            .get()
    };
    let before = counter();

    let req = test::TestRequest::post()
        .uri("/initiate-payment")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request body"));
    assert!(counter() > before);
    assert!(state.orchestrator.client().initiated.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_webhook_empty_fields_are_forwarded() {
    let state = make_state(MockClient::compatible("m-1"));
    let app = app!(state);
    let mut payload = initialized_webhook();
    payload["secret"] = serde_json::json!("");

    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let completed = state.orchestrator.client().completed.lock().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].secret, "");
}
