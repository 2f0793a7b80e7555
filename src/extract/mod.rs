//! Continuation-token extraction from storefront responses
//!
//! The storefront threads workflow state through its pages: the login form
//! carries a CSRF token, every checkout step page carries a transition
//! token and a state token as hidden inputs, and the workflow-start API
//! returns the checkout id in a JSON payload. Steps declare what to pull
//! and where to store it; the functions here do the pulling.
//!
//! All lookups are pure: the same body and selector always produce the
//! same value. "Not found" is `Ok(None)`, never an error - a missing
//! token only becomes fatal when a later step requires it.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value as JsonValue;

use crate::errors::{Result, StorepulseError};

/// How much of the body to quote in extraction diagnostics.
const EXCERPT_LEN: usize = 120;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("head title").expect("static selector is valid"));

/// Value of the first element matching a CSS selector's attribute.
///
/// Returns `Ok(None)` when nothing matches or the element lacks the
/// attribute. An unparsable selector is an [`StorepulseError::Extraction`]
/// carrying the selector and a truncated body excerpt.
pub fn attribute(body: &str, selector: &str, attr: &str) -> Result<Option<String>> {
    let parsed = Selector::parse(selector).map_err(|_| extraction_error(selector, body))?;
    let document = Html::parse_document(body);
    Ok(document
        .select(&parsed)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.to_string()))
}

/// Value of the first `<input name='...'>` with the given name.
///
/// This is the shape every storefront continuation token takes:
/// `_csrf_token`, `oro_workflow_transition[_token]`,
/// `oro_workflow_transition[state_token]`, the shopping-list type token.
pub fn input_value(body: &str, input_name: &str) -> Result<Option<String>> {
    attribute(body, &format!("input[name='{}']", input_name), "value")
}

/// Trimmed text of `<head><title>`, or `None` when the body has no title.
pub fn page_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// String or number at a JSON pointer path (e.g. `/workflowItem/entity_id`).
///
/// Numbers are rendered without quotes so entity ids can be spliced into
/// URLs either way the server chooses to type them. A body that is not
/// JSON at all is an extraction error; a pointer that resolves to nothing
/// is `Ok(None)`.
pub fn json_pointer(body: &str, pointer: &str) -> Result<Option<String>> {
    let json: JsonValue =
        serde_json::from_str(body).map_err(|_| extraction_error(pointer, body))?;
    Ok(json.pointer(pointer).and_then(|value| match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn extraction_error(selector: &str, body: &str) -> StorepulseError {
    StorepulseError::Extraction {
        selector: selector.to_string(),
        excerpt: body.chars().take(EXCERPT_LEN).collect(),
    }
}
