//! Storefront browsing journey
//!
//! Guest browsing across the main page types, authentication, shopping-list
//! creation through the dialog widget, then the same browsing pages again
//! as a logged-in user. The widget response carries the shopping-list form
//! token; the listing page exposes the created list's id in the menu.

use super::context::ContextField;
use super::step::{BodyField, HeaderMode, StepDefinition};
use super::ScenarioConfig;

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
        StepDefinition::get(
            "load_product_search_page_guest_user",
            format!("{base}/product/search?search=tag&_rand=0.8149753010063636"),
        )
        .check_status(200)
        .check_body("Search results for \"tag\" are present", "Search Results for &quot;tag&quot;")
        .think(),
        StepDefinition::get(
            "load_product_detail_page_guest_user",
            format!("{base}/product/view/12"),
        )
        .check_status(200)
        .check_body("SKU 2TK59 is present", "2TK59")
        .think(),
        StepDefinition::get(
            "load_product_listing_page_guest_user",
            format!("{base}/navigation-root/products/by-category/industrial/lighting-products"),
        )
        .check_status(200)
        .check_body("Category name is present", "Lighting  Products")
        .think(),
        StepDefinition::get("load_about_page_cms_guest_user", format!("{base}/about"))
            .check_status(200)
            .check_body("CMS page headline is present", "We Are the Leading RV")
            .think(),
        StepDefinition::get("load_login_page", format!("{base}/customer/user/login"))
            .header("referer", base)
            .check_status(200)
            .check_body("Login form is displayed", "Remember Me")
            .think(),
        StepDefinition::post(
            "authentication_post_request",
            format!("{base}/customer/user/login-check"),
        )
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
        .think(),
        StepDefinition::get("load_home_page_logged_in_user", format!("{base}/"))
            .check_status(200)
            .check_body("Customer name is present", "Amanda Cole")
            .think(),
        StepDefinition::get(
            "create_sl_widget",
            format!(
                "{base}/customer/shoppinglist/create?createOnly=true&_widgetContainer=dialog&_wid={{widget_id}}&_widgetInit=1"
            ),
        )
        .mode(HeaderMode::Transition)
        .requires(&[ContextField::CsrfToken, ContextField::WidgetId])
        .check_status(200)
        .check_body("Create New Shopping List dialog is present", "Shopping List Name")
        .extract_input(ContextField::ShoppingListTypeToken, "oro_shopping_list_type[_token]")
        .think(),
        StepDefinition::post(
            "create_sl_request_post_request",
            format!("{base}/customer/shoppinglist/create"),
        )
        .mode(HeaderMode::Transition)
        .requires(&[
            ContextField::CsrfToken,
            ContextField::WidgetId,
            ContextField::ShoppingListTypeToken,
        ])
        .header("origin", base)
        .form(vec![
            BodyField::context("_wid", ContextField::WidgetId),
            BodyField::literal("_widgetContainer", "dialog"),
            BodyField::literal("_widgetInit", "0"),
            BodyField::context("oro_shopping_list_type[_token]", ContextField::ShoppingListTypeToken),
            BodyField::literal("oro_shopping_list_type[label]", "SL for storepulse"),
        ])
        .check_status(200)
        .check_body("Shopping list creation confirmation appears", "was created successfully")
        .think(),
        StepDefinition::get(
            "load_product_search_page_logged_in_user",
            format!("{base}/product/search?search=tag&_rand=0.8149753010063636"),
        )
        .check_status(200)
        .check_body("Search results for \"tag\" are present", "Search Results for &quot;tag&quot;")
        .think(),
        StepDefinition::get(
            "load_product_detail_page_logged_in_user",
            format!("{base}/product/view/12"),
        )
        .check_status(200)
        .check_body("SKU 2TK59 is present", "2TK59")
        .think(),
        StepDefinition::get(
            "load_product_listing_page_logged_in_user",
            format!("{base}/navigation-root/products/by-category/industrial/lighting-products"),
        )
        .check_status(200)
        .check_body("Category name is present", "Lighting  Products")
        .extract_input(ContextField::ShoppingListId, "main_menu_shopping_lists_dropdown_item-radio"),
    ]
}
