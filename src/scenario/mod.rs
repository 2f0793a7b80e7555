//! Scenario catalog
//!
//! The journeys the harness can replay, expressed as ordered step data.
//! One engine executes all of them; variants differ only in their
//! [`StepDefinition`] lists, never in control logic.

pub mod context;
pub mod step;

mod checkout;
mod storefront;
mod warmup;

pub use context::{ContextField, ScenarioContext};
pub use step::{
    BodyField, BodySpec, Check, ExtractSource, Extraction, FieldSource, HeaderMode, Method,
    Predicate, StepDefinition,
};

use std::collections::BTreeMap;

use clap::ValueEnum;
use uuid::Uuid;

use crate::metrics::thresholds::{Aggregate, Threshold};

/// User agent for the measured journeys; matches what the monitoring
/// infrastructure sends so the traffic is classified the same way.
pub const MONITORING_USER_AGENT: &str = "GoogleStackdriverMonitoring";

/// Browser user agent for cache warming, where the point is to populate
/// the caches real visitors will hit.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.159 Safari/537.36";

/// The journeys available via `--scenario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// Authenticated multi-step checkout from an existing shopping list
    Checkout,
    /// Guest and authenticated browsing plus shopping-list creation
    Storefront,
    /// Guest-only page sweep for cache warming
    Warmup,
}

/// Values a scenario's step data is parameterized over.
#[derive(Debug, Clone, Default)]
pub struct ScenarioConfig {
    /// Target origin without a trailing slash
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Pre-existing shopping list that seeds the checkout
    pub shopping_list_id: String,
    /// Server-side shipping method identifier
    pub shipping_method: String,
    /// Server-side payment method identifier
    pub payment_method: String,
}

/// An ordered journey plus the run-level policy attached to it.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub user_agent: &'static str,
    /// Aggregates the scenario's step series are held to
    pub aggregates: &'static [Aggregate],
    pub steps: Vec<StepDefinition>,
    needs_widget_id: bool,
}

impl Scenario {
    fn new(
        name: &'static str,
        user_agent: &'static str,
        aggregates: &'static [Aggregate],
        steps: Vec<StepDefinition>,
    ) -> Self {
        let needs_widget_id = steps
            .iter()
            .any(|step| step.references(ContextField::WidgetId));
        Self {
            name,
            user_agent,
            aggregates,
            steps,
            needs_widget_id,
        }
    }

    /// Context for a new iteration: empty except for the harness-generated
    /// dialog widget id, which browsers mint fresh per dialog open.
    pub fn fresh_context(&self) -> ScenarioContext {
        let mut ctx = ScenarioContext::new();
        if self.needs_widget_id {
            ctx.set(ContextField::WidgetId, Uuid::new_v4().to_string());
        }
        ctx
    }

    /// Threshold expressions for every thresholded step series, built from
    /// the configured bounds. A bound that does not apply to this scenario's
    /// aggregates is ignored.
    pub fn threshold_map(
        &self,
        p95_bound_ms: Option<f64>,
        avg_bound_ms: Option<f64>,
    ) -> BTreeMap<String, Vec<Threshold>> {
        let mut map = BTreeMap::new();
        for step in self.steps.iter().filter(|s| s.thresholded) {
            let mut thresholds = Vec::new();
            for aggregate in self.aggregates {
                let bound = match aggregate {
                    Aggregate::P95 => p95_bound_ms,
                    Aggregate::Mean => avg_bound_ms,
                };
                if let Some(bound_ms) = bound {
                    thresholds.push(Threshold {
                        aggregate: *aggregate,
                        bound_ms,
                    });
                }
            }
            if !thresholds.is_empty() {
                map.insert(step.name.clone(), thresholds);
            }
        }
        map
    }
}

/// Build the step list for a journey from the run configuration.
pub fn build(kind: ScenarioKind, config: &ScenarioConfig) -> Scenario {
    match kind {
        ScenarioKind::Checkout => Scenario::new(
            "checkout",
            MONITORING_USER_AGENT,
            &[Aggregate::P95, Aggregate::Mean],
            checkout::steps(config),
        ),
        ScenarioKind::Storefront => Scenario::new(
            "storefront",
            MONITORING_USER_AGENT,
            &[Aggregate::P95, Aggregate::Mean],
            storefront::steps(config),
        ),
        ScenarioKind::Warmup => Scenario::new(
            "warmup",
            BROWSER_USER_AGENT,
            &[Aggregate::Mean],
            warmup::steps(config),
        ),
    }
}
