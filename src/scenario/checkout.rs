//! Checkout journey
//!
//! Sign in, open an existing shopping list, start the checkout workflow
//! from it, and walk the state machine through billing, shipping, payment
//! and review to a placed order. Every transition POST must carry the
//! transition/state token pair extracted from the previous step's page.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::context::ContextField;
use super::step::{BodyField, HeaderMode, StepDefinition};
use super::ScenarioConfig;

/// Entity class the workflow-start API expects for shopping lists.
const SHOPPING_LIST_ENTITY_CLASS: &str = r"Oro\Bundle\ShoppingListBundle\Entity\ShoppingList";

const TRANSITION_TOKENS: &[ContextField] = &[
    ContextField::CsrfToken,
    ContextField::CheckoutId,
    ContextField::TransitionToken,
    ContextField::StateToken,
];

pub fn steps(config: &ScenarioConfig) -> Vec<StepDefinition> {
    let base = config.base_url.as_str();

    vec![
        StepDefinition::get("fetch_csrf_token", format!("{base}/customer/user/login"))
            .header("referer", base)
            .extract_input(ContextField::CsrfToken, "_csrf_token")
            .unthresholded(),
        StepDefinition::get("load_home_page_guest_user", format!("{base}/"))
            .check_status(200)
            .check_body("Homepage sign in link present", "Sign Up")
            .think(),
        StepDefinition::get("load_login_page", format!("{base}/customer/user/login"))
            .header("referer", base)
            .check_status(200)
            .check_body("Login form is displayed", "Remember Me")
            .think(),
        login_check_step(config).unthresholded().think(),
        StepDefinition::get("reload_home_page_logged_in", format!("{base}/"))
            .check_status(200)
            .check_body("Customer name is present", "Amanda Cole")
            .unthresholded(),
        StepDefinition::get(
            "load_shopping_list_page",
            format!("{base}/customer/shoppinglist/update/{}", config.shopping_list_id),
        )
        .check_status(200),
        start_checkout_step(config).think(),
        StepDefinition::get(
            "load_billing_information_step_page",
            format!("{base}/customer/checkout/{{checkout_id}}?_rand=0.7609077501757973"),
        )
        .requires(&[ContextField::CheckoutId])
        .header("upgrade-insecure-requests", "1")
        .check_status(200)
        .check_title("Billing information page is opened", "Billing Information - Checkout")
        .extract_input(ContextField::TransitionToken, "oro_workflow_transition[_token]")
        .extract_input(ContextField::StateToken, "oro_workflow_transition[state_token]"),
        StepDefinition::get(
            "load_get_US_country_regions_request",
            format!("{base}/api/rest/latest/country/regions/US"),
        )
        .mode(HeaderMode::Transition)
        .requires(&[ContextField::CsrfToken])
        .header("accept", "application/json, text/javascript, */*; q=0.01")
        .check_status(200),
        StepDefinition::post(
            "load_shipping_information_step_page",
            transition_url(base, "continue_to_shipping_address"),
        )
        .mode(HeaderMode::Transition)
        .requires(TRANSITION_TOKENS)
        .multipart(billing_address_fields())
        .check_status(200)
        .check_title("Shipping Information page opened", "Shipping Information - Checkout")
        .extract_input(ContextField::TransitionToken, "oro_workflow_transition[_token]")
        .extract_input(ContextField::StateToken, "oro_workflow_transition[state_token]"),
        StepDefinition::post(
            "load_shipping_method_step_page",
            transition_url(base, "continue_to_shipping_method"),
        )
        .mode(HeaderMode::Transition)
        .requires(TRANSITION_TOKENS)
        .multipart(shipping_address_fields())
        .check_status(200)
        .check_title("Shipping Method page opened", "Shipping Method - Checkout")
        .extract_input(ContextField::TransitionToken, "oro_workflow_transition[_token]")
        .extract_input(ContextField::StateToken, "oro_workflow_transition[state_token]"),
        StepDefinition::post(
            "load_payment_method_step_page",
            transition_url(base, "continue_to_payment"),
        )
        .mode(HeaderMode::Transition)
        .requires(TRANSITION_TOKENS)
        .multipart(vec![
            BodyField::context("oro_workflow_transition[_token]", ContextField::TransitionToken),
            BodyField::literal("oro_workflow_transition[shipping_method]", &config.shipping_method),
            BodyField::literal("oro_workflow_transition[shipping_method_type]", "primary"),
            BodyField::context("oro_workflow_transition[state_token]", ContextField::StateToken),
        ])
        .check_status(200)
        .check_title("Payment Method page opened", "Payment - Checkout")
        .extract_input(ContextField::TransitionToken, "oro_workflow_transition[_token]")
        .extract_input(ContextField::StateToken, "oro_workflow_transition[state_token]"),
        StepDefinition::post(
            "load_order_review_page",
            transition_url(base, "continue_to_order_review"),
        )
        .mode(HeaderMode::Transition)
        .requires(TRANSITION_TOKENS)
        .multipart(vec![
            BodyField::context("oro_workflow_transition[_token]", ContextField::TransitionToken),
            BodyField::literal("oro_workflow_transition[payment_method]", &config.payment_method),
            BodyField::literal("oro_workflow_transition[payment_save_for_later]", "1"),
            BodyField::context("oro_workflow_transition[state_token]", ContextField::StateToken),
            BodyField::literal("oro_workflow_transition[additional_data]", ""),
        ])
        .check_status(200)
        .check_title("Order review page opened", "Order Review - Checkout")
        .extract_input(ContextField::TransitionToken, "oro_workflow_transition[_token]")
        .extract_input(ContextField::StateToken, "oro_workflow_transition[state_token]"),
        StepDefinition::post("load_place_order_transition", transition_url(base, "place_order"))
            .mode(HeaderMode::Transition)
            .requires(TRANSITION_TOKENS)
            .multipart(vec![
                BodyField::context("oro_workflow_transition[_token]", ContextField::TransitionToken),
                BodyField::literal("oro_workflow_transition[ship_until]", ""),
                BodyField::literal("oro_workflow_transition[po_number]", ""),
                BodyField::literal("oro_workflow_transition[customer_notes]", ""),
                BodyField::context("oro_workflow_transition[state_token]", ContextField::StateToken),
            ])
            .check_status(200),
        StepDefinition::get(
            "load_thank_you_page",
            format!("{base}/customer/checkout/{{checkout_id}}?transition=finish_checkout&_rand=0.26619231848467617"),
        )
        .requires(&[ContextField::CheckoutId])
        .header("upgrade-insecure-requests", "1")
        .check_status(200)
        .check_title(
            "Thank You For Your Purchase page opened",
            "Thank You For Your Purchase! - Checkout",
        ),
    ]
}

/// Authentication POST; the CSRF token rides in both the form body and the
/// anti-forgery header.
fn login_check_step(config: &ScenarioConfig) -> StepDefinition {
    let base = config.base_url.as_str();
    StepDefinition::post("submit_login_check", format!("{base}/customer/user/login-check"))
        .mode(HeaderMode::Ajax)
        .requires(&[ContextField::CsrfToken])
        .header("origin", base)
        .header("referer", &format!("{base}/customer/user/login"))
        .header("sec-fetch-dest", "empty")
        .header("sec-fetch-mode", "cors")
        .header("sec-fetch-site", "same-origin")
        .form(vec![
            BodyField::literal("_username", &config.username),
            BodyField::literal("_password", &config.password),
            BodyField::literal("_remember_me", "on"),
            BodyField::literal("_target_path", ""),
            BodyField::literal("_failure_path", ""),
            BodyField::context("_csrf_token", ContextField::CsrfToken),
        ])
        .check_status(200)
}

/// Workflow start from the configured shopping list; the checkout id comes
/// back in the JSON response and everything downstream hangs off it.
fn start_checkout_step(config: &ScenarioConfig) -> StepDefinition {
    let base = config.base_url.as_str();
    let entity_class = utf8_percent_encode(SHOPPING_LIST_ENTITY_CLASS, NON_ALPHANUMERIC);
    StepDefinition::post(
        "load_start_checkout_from_shopping_list_transition",
        format!(
            "{base}/api/rest/latest/workflow/start/b2b_flow_checkout/start_from_shoppinglist?entityClass={entity_class}&entityId={id}&route=oro_shopping_list_frontend_update",
            id = config.shopping_list_id,
        ),
    )
    .mode(HeaderMode::Ajax)
    .requires(&[ContextField::CsrfToken])
    .header("origin", base)
    .header(
        "referer",
        &format!("{base}/customer/shoppinglist/update/{}", config.shopping_list_id),
    )
    .check_status(200)
    .extract_json(ContextField::CheckoutId, "/workflowItem/entity_id")
}

fn transition_url(base: &str, transition: &str) -> String {
    format!(
        "{base}/customer/checkout/{{checkout_id}}?transition={transition}&_widgetContainer=ajax&_wid=ajax_checkout"
    )
}

fn billing_address_fields() -> Vec<BodyField> {
    vec![
        BodyField::context("oro_workflow_transition[_token]", ContextField::TransitionToken),
        BodyField::literal("oro_workflow_transition[billing_address][customerAddress]", "0"),
        BodyField::literal("oro_workflow_transition[email]", "amanda.cole@example.com"),
        BodyField::literal("oro_workflow_transition[billing_address][label]", "Custom order"),
        BodyField::literal("oro_workflow_transition[billing_address][namePrefix]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][firstName]", "Amanda"),
        BodyField::literal("oro_workflow_transition[billing_address][middleName]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][lastName]", "Cole"),
        BodyField::literal("oro_workflow_transition[billing_address][nameSuffix]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][organization]", "Oro"),
        BodyField::literal("oro_workflow_transition[billing_address][phone]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][street]", "801 Scenic Hwy"),
        BodyField::literal("oro_workflow_transition[billing_address][street2]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][city]", "Haines City"),
        BodyField::literal("oro_workflow_transition[billing_address][country]", "US"),
        BodyField::literal("oro_workflow_transition[billing_address][region]", "US-FL"),
        BodyField::literal("oro_workflow_transition[billing_address][postalCode]", "33844"),
        BodyField::literal("oro_workflow_transition[save_billing_address]", "0"),
        BodyField::literal("oro_workflow_transition[billing_address][id]", ""),
        BodyField::literal("oro_workflow_transition[billing_address][region_text]", ""),
        BodyField::context("oro_workflow_transition[state_token]", ContextField::StateToken),
    ]
}

fn shipping_address_fields() -> Vec<BodyField> {
    vec![
        BodyField::context("oro_workflow_transition[_token]", ContextField::TransitionToken),
        BodyField::literal("oro_workflow_transition[shipping_address][customerAddress]", "0"),
        BodyField::literal("oro_workflow_transition[shipping_address][label]", "Pr address"),
        BodyField::literal("oro_workflow_transition[shipping_address][namePrefix]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][firstName]", "Amanda"),
        BodyField::literal("oro_workflow_transition[shipping_address][middleName]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][lastName]", "Cole"),
        BodyField::literal("oro_workflow_transition[shipping_address][nameSuffix]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][organization]", "ORO"),
        BodyField::literal("oro_workflow_transition[shipping_address][phone]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][street]", "801 Scenic Hwy"),
        BodyField::literal("oro_workflow_transition[shipping_address][street2]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][city]", "Haines City"),
        BodyField::literal("oro_workflow_transition[shipping_address][country]", "US"),
        BodyField::literal("oro_workflow_transition[shipping_address][region]", "US-FL"),
        BodyField::literal("oro_workflow_transition[shipping_address][postalCode]", "33844"),
        BodyField::literal("oro_workflow_transition[shipping_address][id]", ""),
        BodyField::literal("oro_workflow_transition[shipping_address][region_text]", ""),
        BodyField::context("oro_workflow_transition[state_token]", ContextField::StateToken),
    ]
}
