//! Per-iteration workflow context
//!
//! One context lives for exactly one journey of one simulated user. It is
//! created empty, filled in by step extractions, and dropped with the
//! iteration - never pooled and never visible to another virtual user, so
//! tokens cannot leak between sessions.

use std::fmt;

/// The context fields steps can require, populate, and splice into URLs
/// and request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextField {
    /// Anti-forgery token from the login page (`_csrf_token`)
    CsrfToken,
    /// Workflow transition token (`oro_workflow_transition[_token]`)
    TransitionToken,
    /// Workflow state token (`oro_workflow_transition[state_token]`)
    StateToken,
    /// Checkout entity id issued by the workflow-start API
    CheckoutId,
    /// Shopping-list id scraped from the navigation menu
    ShoppingListId,
    /// Shopping-list dialog token (`oro_shopping_list_type[_token]`)
    ShoppingListTypeToken,
    /// Harness-generated dialog widget id, fresh per iteration
    WidgetId,
}

impl ContextField {
    /// Placeholder name used in URL templates and diagnostics.
    pub fn key(self) -> &'static str {
        match self {
            ContextField::CsrfToken => "csrf_token",
            ContextField::TransitionToken => "transition_token",
            ContextField::StateToken => "state_token",
            ContextField::CheckoutId => "checkout_id",
            ContextField::ShoppingListId => "shopping_list_id",
            ContextField::ShoppingListTypeToken => "shopping_list_type_token",
            ContextField::WidgetId => "widget_id",
        }
    }

    /// Reverse of [`ContextField::key`], for URL template placeholders.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "csrf_token" => Some(ContextField::CsrfToken),
            "transition_token" => Some(ContextField::TransitionToken),
            "state_token" => Some(ContextField::StateToken),
            "checkout_id" => Some(ContextField::CheckoutId),
            "shopping_list_id" => Some(ContextField::ShoppingListId),
            "shopping_list_type_token" => Some(ContextField::ShoppingListTypeToken),
            "widget_id" => Some(ContextField::WidgetId),
            _ => None,
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Token store for a single iteration.
///
/// Every field is either empty (not yet produced) or holds the most
/// recently extracted value; writes are last-write-wins so later steps
/// always see the freshest tokens. Session cookies are not stored here -
/// they belong to the iteration's HTTP client.
#[derive(Debug, Default, Clone)]
pub struct ScenarioContext {
    csrf_token: Option<String>,
    transition_token: Option<String>,
    state_token: Option<String>,
    checkout_id: Option<String>,
    shopping_list_id: Option<String>,
    shopping_list_type_token: Option<String>,
    widget_id: Option<String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field, or `None` while unset.
    pub fn get(&self, field: ContextField) -> Option<&str> {
        let slot = match field {
            ContextField::CsrfToken => &self.csrf_token,
            ContextField::TransitionToken => &self.transition_token,
            ContextField::StateToken => &self.state_token,
            ContextField::CheckoutId => &self.checkout_id,
            ContextField::ShoppingListId => &self.shopping_list_id,
            ContextField::ShoppingListTypeToken => &self.shopping_list_type_token,
            ContextField::WidgetId => &self.widget_id,
        };
        slot.as_deref()
    }

    /// Replace a field's value. Stale tokens must never survive a step
    /// that produced a replacement.
    pub fn set(&mut self, field: ContextField, value: String) {
        let slot = match field {
            ContextField::CsrfToken => &mut self.csrf_token,
            ContextField::TransitionToken => &mut self.transition_token,
            ContextField::StateToken => &mut self.state_token,
            ContextField::CheckoutId => &mut self.checkout_id,
            ContextField::ShoppingListId => &mut self.shopping_list_id,
            ContextField::ShoppingListTypeToken => &mut self.shopping_list_type_token,
            ContextField::WidgetId => &mut self.widget_id,
        };
        *slot = Some(value);
    }

    /// Merge a step's extracted values, overwriting same-named fields.
    pub fn merge(&mut self, extracted: impl IntoIterator<Item = (ContextField, String)>) {
        for (field, value) in extracted {
            self.set(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let ctx = ScenarioContext::new();
        assert_eq!(ctx.get(ContextField::CsrfToken), None);
        assert_eq!(ctx.get(ContextField::CheckoutId), None);
    }

    #[test]
    fn test_values_survive_until_overwritten() {
        let mut ctx = ScenarioContext::new();
        ctx.set(ContextField::TransitionToken, "t1".to_string());
        ctx.set(ContextField::CheckoutId, "9001".to_string());

        // A later step that does not touch checkout_id still sees it.
        ctx.merge([(ContextField::TransitionToken, "t2".to_string())]);
        assert_eq!(ctx.get(ContextField::TransitionToken), Some("t2"));
        assert_eq!(ctx.get(ContextField::CheckoutId), Some("9001"));
    }

    #[test]
    fn test_key_round_trip() {
        for field in [
            ContextField::CsrfToken,
            ContextField::TransitionToken,
            ContextField::StateToken,
            ContextField::CheckoutId,
            ContextField::ShoppingListId,
            ContextField::ShoppingListTypeToken,
            ContextField::WidgetId,
        ] {
            assert_eq!(ContextField::from_key(field.key()), Some(field));
        }
        assert_eq!(ContextField::from_key("nope"), None);
    }
}
