//! Common test utilities for storepulse integration tests
//!
//! Provides canned storefront response bodies (login page, checkout step
//! pages, dialog widgets) and the scenario/runner plumbing the flow tests
//! share. The bodies carry the same hidden-input shapes the real
//! storefront renders.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use storepulse::metrics::MetricRegistry;
use storepulse::runner::{run_iteration, IterationOptions, IterationOutcome, ThinkTime};
use storepulse::scenario::{Scenario, ScenarioConfig};

/// Scenario configuration pointed at a mock server.
pub fn config_for(server_uri: &str) -> ScenarioConfig {
    ScenarioConfig {
        base_url: server_uri.trim_end_matches('/').to_string(),
        username: "amanda.cole@example.com".to_string(),
        password: "p4ssword".to_string(),
        shopping_list_id: "42".to_string(),
        shipping_method: "flat_rate_2".to_string(),
        payment_method: "payment_term_3".to_string(),
    }
}

/// Run one iteration with test pacing (think time in single milliseconds).
pub async fn run_once(scenario: &Scenario, registry: &Arc<MetricRegistry>) -> IterationOutcome {
    let options = IterationOptions {
        request_timeout: Duration::from_secs(5),
        think: ThinkTime {
            floor: Duration::from_millis(1),
            ceiling: Duration::from_millis(3),
        },
    };
    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    run_iteration(scenario, registry, &options, deadline, 1, 0).await
}

/// Minimal storefront page with a title and arbitrary body copy.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head><body>{body}</body></html>"
    )
}

/// Login page carrying the CSRF hidden input.
pub fn login_page(csrf_token: &str) -> String {
    page(
        "Sign In",
        &format!(
            r#"<form action="/customer/user/login-check" method="post">
                <input type="hidden" name="_csrf_token" value="{csrf_token}">
                <label><input type="checkbox" name="_remember_me"> Remember Me</label>
            </form>"#
        ),
    )
}

/// Checkout step page carrying the workflow transition token pair.
pub fn checkout_step_page(title: &str, transition_token: &str, state_token: &str) -> String {
    page(
        title,
        &format!(
            r#"<form name="oro_workflow_transition">
                <input type="hidden" name="oro_workflow_transition[_token]" value="{transition_token}">
                <input type="hidden" name="oro_workflow_transition[state_token]" value="{state_token}">
            </form>"#
        ),
    )
}

/// Checkout step page with no transition tokens at all (server-side error
/// pages look like this).
pub fn checkout_step_page_without_tokens(title: &str) -> String {
    page(title, "<div class=\"alert\">Something went wrong</div>")
}

/// Shopping-list creation dialog with the type-form token.
pub fn shopping_list_dialog(type_token: &str) -> String {
    page(
        "Create New Shopping List",
        &format!(
            r#"<div class="widget-content">
                <label>Shopping List Name</label>
                <input type="hidden" name="oro_shopping_list_type[_token]" value="{type_token}">
            </div>"#
        ),
    )
}

/// Home page; carries the guest sign-up link and, once signed in, the
/// customer name (the mock serves both so one route covers both visits).
pub fn home_page() -> String {
    page(
        "Welcome",
        r#"<a href="/customer/user/registration">Sign Up</a><span class="customer">Amanda Cole</span>"#,
    )
}
