//! Iteration sequencing
//!
//! One invocation replays one journey for one simulated user: steps run
//! strictly in order, extracted tokens are merged into the context after
//! every step, and think-time pacing separates the steps a human would
//! pause between. There is no branching and no retry; a failed check is a
//! data point, a missing required token ends the iteration.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::errors::StorepulseError;
use crate::metrics::{MetricRegistry, CHECK_FAILURE_SERIES};
use crate::scenario::Scenario;
use crate::signals;

use super::executor::StepExecutor;

/// Human-pacing delay bounds. The draw is strictly above the floor and
/// never above the ceiling.
#[derive(Debug, Clone, Copy)]
pub struct ThinkTime {
    pub floor: Duration,
    pub ceiling: Duration,
}

impl ThinkTime {
    pub fn draw(&self) -> Duration {
        let floor_ms = self.floor.as_millis() as u64;
        let ceiling_ms = (self.ceiling.as_millis() as u64).max(floor_ms + 1);
        Duration::from_millis(rand::rng().random_range(floor_ms + 1..=ceiling_ms))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IterationOptions {
    pub request_timeout: Duration,
    pub think: ThinkTime,
}

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationEnd {
    /// Every step ran
    Completed,
    /// The run deadline (or an interrupt) arrived mid-journey; the current
    /// step finished, the rest were abandoned. Not a failure.
    CutShort,
    /// A step's precondition failed; continuing would be meaningless
    Aborted,
}

#[derive(Debug)]
pub struct IterationOutcome {
    pub end: IterationEnd,
    pub last_step: Option<String>,
    pub failures: Vec<String>,
    pub steps_run: usize,
}

/// Replay the scenario once. Never panics and never propagates step
/// errors upward: whatever happens inside one simulated user's journey
/// stays inside it.
pub async fn run_iteration(
    scenario: &Scenario,
    registry: &MetricRegistry,
    options: &IterationOptions,
    deadline: Instant,
    vu: u32,
    iteration: u64,
) -> IterationOutcome {
    let mut outcome = IterationOutcome {
        end: IterationEnd::Completed,
        last_step: None,
        failures: Vec::new(),
        steps_run: 0,
    };

    let executor = match StepExecutor::for_iteration(scenario.user_agent, options.request_timeout) {
        Ok(executor) => executor,
        Err(err) => {
            warn!(vu, iteration, error = %err, "could not build HTTP client");
            outcome.end = IterationEnd::Aborted;
            outcome.failures.push(err.to_string());
            return outcome;
        }
    };
    let mut ctx = scenario.fresh_context();

    let total_steps = scenario.steps.len();
    for (index, step) in scenario.steps.iter().enumerate() {
        if index > 0 && (Instant::now() >= deadline || signals::interrupted()) {
            outcome.end = IterationEnd::CutShort;
            break;
        }

        match executor.execute(step, &ctx).await {
            Ok(step_outcome) => {
                if step_outcome.response_observed() {
                    registry.record_timing(&step.name, step_outcome.latency);
                }
                if !step.checks.is_empty() || step_outcome.error.is_some() {
                    registry.record_rate(CHECK_FAILURE_SERIES, !step_outcome.checks_passed);
                }

                for check in step_outcome.checks.iter().filter(|c| !c.passed) {
                    outcome
                        .failures
                        .push(format!("{}: {}", step.name, check.description));
                }
                for diag in &step_outcome.extraction_errors {
                    warn!(step = %step.name, vu, iteration, "{diag}");
                }

                match (&step_outcome.error, step_outcome.status) {
                    (Some(err), _) => {
                        outcome.failures.push(format!("{}: {}", step.name, err));
                        warn!(step = %step.name, vu, iteration, error = %err, "request failed");
                    }
                    (None, Some(status)) => {
                        info!(
                            step = %step.name,
                            status,
                            ttfb_ms = step_outcome.latency.as_millis() as u64,
                            checks_passed = step_outcome.checks_passed,
                            vu,
                            iteration,
                            "step finished"
                        );
                    }
                    (None, None) => {}
                }

                ctx.merge(step_outcome.extracted);
            }
            Err(err @ StorepulseError::StepPrecondition { .. }) => {
                // The token chain is broken; stop this iteration and leave
                // every other virtual user alone.
                warn!(vu, iteration, "{err}");
                outcome.failures.push(err.to_string());
                outcome.end = IterationEnd::Aborted;
                return outcome;
            }
            Err(err) => {
                warn!(step = %step.name, vu, iteration, error = %err, "step could not be built");
                outcome.failures.push(format!("{}: {}", step.name, err));
                outcome.end = IterationEnd::Aborted;
                return outcome;
            }
        }

        outcome.last_step = Some(step.name.clone());
        outcome.steps_run += 1;

        if step.think_after && index + 1 < total_steps {
            tokio::time::sleep(options.think.draw()).await;
        }
    }

    outcome
}
