//! Metric series collection
//!
//! One registry per run, created at start and read once at the end.
//! Recording must never fail and never block the journeys for long: every
//! iteration of every virtual user appends concurrently, nothing reads
//! until the run is over.

pub mod thresholds;

pub use thresholds::{evaluate, Aggregate, SeriesVerdict, Threshold, ThresholdReport};

use std::time::Duration;

use dashmap::DashMap;
use hdrhistogram::Histogram;
use serde::Serialize;

/// Series name the original harness records per-step check failures under.
pub const CHECK_FAILURE_SERIES: &str = "check_failure_rate";

const MAX_LATENCY_US: u64 = 300_000_000; // 5 minutes

/// Process-wide, append-only store of latency and rate series.
pub struct MetricRegistry {
    timings: DashMap<String, Histogram<u64>>,
    rates: DashMap<String, RateSeries>,
}

/// Pass/fail counter for assertion-style observations.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RateSeries {
    pub total: u64,
    pub failed: u64,
}

impl RateSeries {
    pub fn failure_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

/// Aggregated view of one latency series, computed at run end.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStats {
    pub name: String,
    pub count: u64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p95_ms: f64,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            timings: DashMap::new(),
            rates: DashMap::new(),
        }
    }

    /// Append one latency observation to a named series. Out-of-range
    /// values are clamped rather than dropped so the count stays honest.
    pub fn record_timing(&self, series: &str, latency: Duration) {
        let latency_us = (latency.as_micros() as u64).clamp(1, MAX_LATENCY_US);
        let mut histogram = self
            .timings
            .entry(series.to_string())
            .or_insert_with(new_histogram);
        let _ = histogram.record(latency_us);
    }

    /// Append one pass/fail observation to a named rate series.
    pub fn record_rate(&self, series: &str, failed: bool) {
        let mut rate = self.rates.entry(series.to_string()).or_default();
        rate.total += 1;
        if failed {
            rate.failed += 1;
        }
    }

    /// Aggregates for one series, or `None` when it never recorded.
    pub fn timing_stats(&self, series: &str) -> Option<SeriesStats> {
        self.timings.get(series).map(|histogram| SeriesStats {
            name: series.to_string(),
            count: histogram.len(),
            min_ms: histogram.min() as f64 / 1000.0,
            max_ms: histogram.max() as f64 / 1000.0,
            mean_ms: histogram.mean() / 1000.0,
            p95_ms: histogram.value_at_percentile(95.0) as f64 / 1000.0,
        })
    }

    /// All latency series, sorted by name for stable output.
    pub fn all_timing_stats(&self) -> Vec<SeriesStats> {
        let mut names: Vec<String> = self.timings.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
            .iter()
            .filter_map(|name| self.timing_stats(name))
            .collect()
    }

    pub fn rate(&self, series: &str) -> Option<RateSeries> {
        self.rates.get(series).map(|r| *r)
    }

    pub fn observation_count(&self, series: &str) -> u64 {
        self.timings.get(series).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn new_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, MAX_LATENCY_US, 3).expect("histogram bounds are static")
}
