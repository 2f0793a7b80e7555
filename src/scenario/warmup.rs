//! Cache-warming journey
//!
//! Guest-only sweep over the main storefront page types with a browser
//! user agent. No authentication, no tokens, no state to thread; the run
//! is judged on average latency only.

use super::step::StepDefinition;
use super::ScenarioConfig;

pub fn steps(config: &ScenarioConfig) -> Vec<StepDefinition> {
    let base = config.base_url.as_str();

    vec![
        StepDefinition::get("Load Home Page for guest", format!("{base}/"))
            .check_status(200)
            .check_body("Homepage sign in link present", "Register")
            .think(),
        StepDefinition::get(
            "Load Product Search for guest",
            format!("{base}/product/search?search=tag&_rand=0.8149753010063636"),
        )
        .check_status(200)
        .check_body("Search results for \"tag\" are present", "Search Results for &quot;tag&quot;")
        .think(),
        StepDefinition::get("Load Product Detail Page(PDP) for guest", format!("{base}/product/view/62"))
            .check_status(200)
            .check_body("SKU TAG1 is present", "TAG1")
            .think(),
        StepDefinition::get(
            "Load Product Listing Page(PLP) for guest",
            format!("{base}/navigation-root/products/by-category/industrial/lighting-products"),
        )
        .check_status(200)
        .check_body("Category name is present", "Lighting  Products")
        .think(),
        StepDefinition::get("Load About Page (CMS) for guest", format!("{base}/about"))
            .check_status(200)
            .check_body("CMS page headline is present", "We Are the Leading RV"),
    ]
}
