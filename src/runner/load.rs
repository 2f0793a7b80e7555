//! Virtual-user scheduling
//!
//! One tokio task per simulated user. Each task loops whole journeys until
//! the wall-clock deadline; iterations already in flight when the deadline
//! lands finish their current step and stop. The only state the tasks
//! share is the metric registry and the interrupt flag.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::MetricRegistry;
use crate::scenario::Scenario;
use crate::signals;

use super::sequencer::{run_iteration, IterationEnd, IterationOptions, ThinkTime};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Concurrent simulated users
    pub vus: u32,
    /// Wall-clock test length
    pub duration: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    pub think: ThinkTime,
}

/// Iteration counts across all virtual users.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunTotals {
    pub iterations: u64,
    pub completed: u64,
    /// Deadline or interrupt arrived mid-journey
    pub cut_short: u64,
    /// Ended early on a broken token chain
    pub aborted: u64,
}

impl RunTotals {
    fn absorb(&mut self, outcome_end: IterationEnd) {
        self.iterations += 1;
        match outcome_end {
            IterationEnd::Completed => self.completed += 1,
            IterationEnd::CutShort => self.cut_short += 1,
            IterationEnd::Aborted => self.aborted += 1,
        }
    }

    fn merge(&mut self, other: RunTotals) {
        self.iterations += other.iterations;
        self.completed += other.completed;
        self.cut_short += other.cut_short;
        self.aborted += other.aborted;
    }
}

/// Run the scenario across all virtual users until the deadline.
pub async fn run(
    scenario: Arc<Scenario>,
    registry: Arc<MetricRegistry>,
    options: LoadOptions,
) -> RunTotals {
    let deadline = Instant::now() + options.duration;
    let iteration_options = IterationOptions {
        request_timeout: options.request_timeout,
        think: options.think,
    };

    let mut handles = Vec::with_capacity(options.vus as usize);
    for vu in 1..=options.vus {
        let scenario = scenario.clone();
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let mut totals = RunTotals::default();
            let mut iteration: u64 = 0;
            while Instant::now() < deadline && !signals::interrupted() {
                let outcome =
                    run_iteration(&scenario, &registry, &iteration_options, deadline, vu, iteration)
                        .await;
                totals.absorb(outcome.end);
                iteration += 1;
            }
            debug!(vu, iterations = totals.iterations, "virtual user finished");
            totals
        }));
    }

    let mut totals = RunTotals::default();
    for handle in handles {
        if let Ok(vu_totals) = handle.await {
            totals.merge(vu_totals);
        }
    }
    totals
}
