//! Threshold evaluation over recorded series
//!
//! Runs once at the end of a run. A configured series with zero
//! observations fails its threshold - an untouched series means a whole
//! scenario path silently broke, which is exactly what thresholds exist
//! to surface.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::MetricRegistry;

/// Aggregate a threshold is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    P95,
    Mean,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::P95 => f.write_str("p(95)"),
            Aggregate::Mean => f.write_str("avg"),
        }
    }
}

/// `aggregate < bound_ms` over one series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Threshold {
    pub aggregate: Aggregate,
    pub bound_ms: f64,
}

/// Outcome of one threshold over one series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesVerdict {
    pub series: String,
    pub aggregate: Aggregate,
    pub bound_ms: f64,
    /// `None` when the series recorded nothing; that is a failure, not a skip.
    pub actual_ms: Option<f64>,
    pub observations: u64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub verdicts: Vec<SeriesVerdict>,
}

impl ThresholdReport {
    /// Overall verdict: the AND of all series.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &SeriesVerdict> {
        self.verdicts.iter().filter(|v| !v.passed)
    }
}

/// Evaluate every configured threshold against the registry.
pub fn evaluate(
    registry: &MetricRegistry,
    thresholds: &BTreeMap<String, Vec<Threshold>>,
) -> ThresholdReport {
    let mut verdicts = Vec::new();
    for (series, series_thresholds) in thresholds {
        let stats = registry.timing_stats(series);
        for threshold in series_thresholds {
            let actual_ms = stats.as_ref().map(|s| match threshold.aggregate {
                Aggregate::P95 => s.p95_ms,
                Aggregate::Mean => s.mean_ms,
            });
            let observations = stats.as_ref().map(|s| s.count).unwrap_or(0);
            let passed = actual_ms.is_some_and(|actual| actual < threshold.bound_ms);
            verdicts.push(SeriesVerdict {
                series: series.clone(),
                aggregate: threshold.aggregate,
                bound_ms: threshold.bound_ms,
                actual_ms,
                observations,
                passed,
            });
        }
    }
    ThresholdReport { verdicts }
}
