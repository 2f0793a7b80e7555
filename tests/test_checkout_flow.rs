//! Checkout journey tests
//!
//! Drives the full checkout scenario against a mock storefront and
//! verifies the properties the engine exists for: CSRF and workflow
//! tokens are extracted and threaded into the right follow-up requests,
//! the checkout id from the workflow-start JSON addresses every later
//! call, and a page that loses its tokens stops the iteration before the
//! dependent request leaves the machine.

mod common;

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storepulse::metrics::MetricRegistry;
use storepulse::runner::IterationEnd;
use storepulse::scenario::{build, ScenarioKind};

use common::{checkout_step_page, checkout_step_page_without_tokens, config_for, home_page, login_page, page, run_once};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Mounts the whole happy-path storefront. Token values are distinct per
/// step so the body matchers prove which page each POST's tokens came from.
async fn mount_storefront(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/customer/user/login"))
        .respond_with(html(login_page("abc123")))
        .expect(2) // csrf fetch + measured login page
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(home_page()))
        .expect(2) // guest visit + logged-in revisit
        .mount(server)
        .await;

    // The login POST must carry the CSRF token both ways: form field and
    // anti-forgery header.
    Mock::given(method("POST"))
        .and(path("/customer/user/login-check"))
        .and(header("x-csrf-header", "abc123"))
        .and(body_string_contains("_csrf_token=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/customer/shoppinglist/update/42"))
        .respond_with(html(page("Shopping List", "items")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(
            "/api/rest/latest/workflow/start/b2b_flow_checkout/start_from_shoppinglist",
        ))
        .and(query_param("entityId", "42"))
        .and(header("x-csrf-header", "abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"workflowItem": {"entity_id": "9001"}})),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("_rand", "0.7609077501757973"))
        .respond_with(html(checkout_step_page(
            "Billing Information - Checkout",
            "tok-billing",
            "state-billing",
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/rest/latest/country/regions/US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"region": []})))
        .expect(1)
        .mount(server)
        .await;

    // Each transition must present the token pair extracted from the
    // previous step's page.
    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "continue_to_shipping_address"))
        .and(body_string_contains("tok-billing"))
        .and(body_string_contains("state-billing"))
        .respond_with(html(checkout_step_page(
            "Shipping Information - Checkout",
            "tok-shipping",
            "state-shipping",
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "continue_to_shipping_method"))
        .and(body_string_contains("tok-shipping"))
        .respond_with(html(checkout_step_page(
            "Shipping Method - Checkout",
            "tok-method",
            "state-method",
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "continue_to_payment"))
        .and(body_string_contains("tok-method"))
        .and(body_string_contains("flat_rate_2"))
        .respond_with(html(checkout_step_page(
            "Payment - Checkout",
            "tok-payment",
            "state-payment",
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "continue_to_order_review"))
        .and(body_string_contains("tok-payment"))
        .and(body_string_contains("payment_term_3"))
        .respond_with(html(checkout_step_page(
            "Order Review - Checkout",
            "tok-review",
            "state-review",
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "place_order"))
        .and(body_string_contains("tok-review"))
        .respond_with(html(page("Order placed", "ok")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/customer/checkout/9001"))
        .and(query_param("transition", "finish_checkout"))
        .respond_with(html(page("Thank You For Your Purchase! - Checkout", "order confirmed")))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_checkout_journey_threads_tokens() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let scenario = build(ScenarioKind::Checkout, &config_for(&server.uri()));
    let registry = Arc::new(MetricRegistry::new());

    let outcome = run_once(&scenario, &registry).await;

    assert_eq!(outcome.end, IterationEnd::Completed, "failures: {:?}", outcome.failures);
    assert!(outcome.failures.is_empty(), "unexpected failures: {:?}", outcome.failures);
    assert_eq!(outcome.steps_run, scenario.steps.len());
    assert_eq!(outcome.last_step.as_deref(), Some("load_thank_you_page"));

    // One observation per step series.
    for step in &scenario.steps {
        assert_eq!(
            registry.observation_count(&step.name),
            1,
            "series `{}` should have exactly one observation",
            step.name
        );
    }

    // Every check passed, so the failure rate is all-pass.
    let rate = registry.rate("check_failure_rate").unwrap();
    assert_eq!(rate.failed, 0);
    assert!(rate.total > 0);

    // Mock expectations (token matchers included) verify on drop.
    server.verify().await;
}

#[tokio::test]
async fn test_missing_transition_tokens_abort_before_next_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customer/user/login"))
        .respond_with(html(login_page("abc123")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(home_page()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customer/user/login-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/customer/shoppinglist/update/42"))
        .respond_with(html(page("Shopping List", "items")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(
            "/api/rest/latest/workflow/start/b2b_flow_checkout/start_from_shoppinglist",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"workflowItem": {"entity_id": "9001"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rest/latest/country/regions/US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"region": []})))
        .mount(&server)
        .await;

    // Billing page renders without the workflow token inputs.
    Mock::given(method("GET"))
        .and(path("/customer/checkout/9001"))
        .respond_with(html(checkout_step_page_without_tokens(
            "Billing Information - Checkout",
        )))
        .mount(&server)
        .await;

    // The shipping transition must never be attempted.
    Mock::given(method("POST"))
        .and(path("/customer/checkout/9001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let scenario = build(ScenarioKind::Checkout, &config_for(&server.uri()));
    let registry = Arc::new(MetricRegistry::new());

    let outcome = run_once(&scenario, &registry).await;

    assert_eq!(outcome.end, IterationEnd::Aborted);
    assert!(
        outcome
            .failures
            .iter()
            .any(|f| f.contains("load_shipping_information_step_page") && f.contains("transition_token")),
        "failures: {:?}",
        outcome.failures
    );
    // The dependent step never ran, so its series stays empty.
    assert_eq!(registry.observation_count("load_shipping_information_step_page"), 0);

    server.verify().await;
}

#[tokio::test]
async fn test_failed_checks_do_not_stop_the_journey() {
    // A storefront whose pages miss the expected copy: every content
    // check fails, unmocked routes 404, but the guest sweep has no token
    // chain to break and must still run to the end.
    let bare = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(page("Welcome", "nothing to see")))
        .mount(&bare)
        .await;

    let scenario = build(ScenarioKind::Warmup, &config_for(&bare.uri()));
    let registry = Arc::new(MetricRegistry::new());

    let outcome = run_once(&scenario, &registry).await;

    // Pages 404 or miss their needles, yet the sweep runs to the end.
    assert_eq!(outcome.end, IterationEnd::Completed);
    assert!(!outcome.failures.is_empty());
    assert_eq!(outcome.steps_run, scenario.steps.len());

    let rate = registry.rate("check_failure_rate").unwrap();
    assert!(rate.failed > 0);
}
