//! End-of-run summary rendering and the JSON report file
//!
//! The terminal summary mirrors what operators look for first: the latency
//! table per step, the threshold verdicts by name, and a single overall
//! line. The JSON report carries the same data for dashboards; HTML
//! rendering is somebody else's job.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::Result;
use crate::metrics::{RateSeries, SeriesStats, ThresholdReport};
use crate::runner::RunTotals;

use super::terminal::{self, colors};

/// Everything the end of a run has to say.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub base_url: String,
    pub vus: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub totals: RunTotals,
    pub series: Vec<SeriesStats>,
    pub check_failure: Option<RateSeries>,
    pub thresholds: ThresholdReport,
    pub passed: bool,
}

/// Render the human-readable summary.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    let header_line = terminal::colorize(
        "═══════════════════════════════════════════════════════════════════",
        colors::GREY,
    );
    let section_line = terminal::colorize(
        "───────────────────────────────────────────────────────────────────",
        colors::GREY,
    );

    output.push('\n');
    output.push_str(&header_line);
    output.push('\n');
    output.push_str(&format!(
        "{}\n",
        terminal::bold("                          RUN SUMMARY", colors::WHITE)
    ));
    output.push_str(&header_line);
    output.push_str("\n\n");

    output.push_str(&format!(
        "  {}         {}\n",
        terminal::label("Scenario:"),
        terminal::colorize(&summary.scenario, colors::AQUA)
    ));
    output.push_str(&format!(
        "  {}           {}\n",
        terminal::label("Target:"),
        terminal::colorize(&summary.base_url, colors::AQUA)
    ));
    output.push_str(&format!(
        "  {}    {}\n",
        terminal::label("Virtual users:"),
        terminal::number(&summary.vus.to_string())
    ));
    output.push_str(&format!(
        "  {}         {}\n",
        terminal::label("Duration:"),
        terminal::number(&format!("{:.2}s", summary.elapsed_secs))
    ));
    output.push_str(&format!(
        "  {}       {} ({} completed, {} cut short, {} aborted)\n",
        terminal::label("Iterations:"),
        terminal::number(&summary.totals.iterations.to_string()),
        terminal::number(&summary.totals.completed.to_string()),
        terminal::number(&summary.totals.cut_short.to_string()),
        terminal::number(&summary.totals.aborted.to_string()),
    ));
    output.push('\n');

    output.push_str(&section_line);
    output.push('\n');
    output.push_str(&format!(
        "  {}\n",
        terminal::bold("TIME TO FIRST BYTE BY STEP", colors::WHITE)
    ));
    output.push_str(&section_line);
    output.push('\n');
    output.push_str(&format!(
        "  {:<58} {:>6} {:>10} {:>10} {:>10}\n",
        terminal::muted("step"),
        terminal::muted("count"),
        terminal::muted("mean"),
        terminal::muted("p95"),
        terminal::muted("max"),
    ));
    for stats in &summary.series {
        output.push_str(&format!(
            "  {:<58} {:>6} {:>10} {:>10} {:>10}\n",
            terminal::label(&stats.name),
            terminal::number(&stats.count.to_string()),
            terminal::number(&format!("{:.1}ms", stats.mean_ms)),
            terminal::number(&format!("{:.1}ms", stats.p95_ms)),
            terminal::number(&format!("{:.1}ms", stats.max_ms)),
        ));
    }
    output.push('\n');

    if let Some(rate) = &summary.check_failure {
        output.push_str(&format!(
            "  {}    {} of {} ({})\n\n",
            terminal::label("Failed checks:"),
            terminal::colorize(
                &rate.failed.to_string(),
                if rate.failed == 0 { colors::GREEN } else { colors::RED }
            ),
            terminal::number(&rate.total.to_string()),
            terminal::muted(&format!("{:.1}%", rate.failure_ratio() * 100.0)),
        ));
    }

    output.push_str(&section_line);
    output.push('\n');
    output.push_str(&format!("  {}\n", terminal::bold("THRESHOLDS", colors::WHITE)));
    output.push_str(&section_line);
    output.push('\n');
    if summary.thresholds.verdicts.is_empty() {
        output.push_str(&format!("  {}\n", terminal::muted("none configured")));
    }
    for verdict in &summary.thresholds.verdicts {
        let mark = if verdict.passed {
            terminal::success("✓")
        } else {
            terminal::error("✗")
        };
        let actual = match verdict.actual_ms {
            Some(ms) => format!("{:.1}ms", ms),
            None => "no observations".to_string(),
        };
        output.push_str(&format!(
            "  {} {:<58} {} < {}  ({})\n",
            mark,
            terminal::label(&verdict.series),
            verdict.aggregate,
            terminal::number(&format!("{:.0}ms", verdict.bound_ms)),
            terminal::colorize(&actual, if verdict.passed { colors::GREEN } else { colors::RED }),
        ));
    }
    output.push('\n');

    output.push_str(&header_line);
    output.push('\n');
    let verdict_line = if summary.passed {
        terminal::success("ALL THRESHOLDS PASSED")
    } else {
        terminal::error("THRESHOLDS FAILED")
    };
    output.push_str(&format!("  {}\n", verdict_line));
    output.push_str(&header_line);
    output.push('\n');

    output
}

/// Write the summary as pretty-printed JSON.
pub fn write_json_report(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Aggregate, SeriesVerdict};

    fn sample_summary() -> RunSummary {
        RunSummary {
            scenario: "checkout".to_string(),
            base_url: "https://shop.test".to_string(),
            vus: 5,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed_secs: 60.0,
            totals: RunTotals {
                iterations: 12,
                completed: 10,
                cut_short: 1,
                aborted: 1,
            },
            series: vec![SeriesStats {
                name: "load_login_page".to_string(),
                count: 12,
                min_ms: 80.0,
                max_ms: 410.0,
                mean_ms: 140.0,
                p95_ms: 390.0,
            }],
            check_failure: Some(RateSeries { total: 120, failed: 3 }),
            thresholds: ThresholdReport {
                verdicts: vec![
                    SeriesVerdict {
                        series: "load_login_page".to_string(),
                        aggregate: Aggregate::P95,
                        bound_ms: 500.0,
                        actual_ms: Some(390.0),
                        observations: 12,
                        passed: true,
                    },
                    SeriesVerdict {
                        series: "load_thank_you_page".to_string(),
                        aggregate: Aggregate::P95,
                        bound_ms: 500.0,
                        actual_ms: None,
                        observations: 0,
                        passed: false,
                    },
                ],
            },
            passed: false,
        }
    }

    #[test]
    fn test_format_summary_sections() {
        let output = format_summary(&sample_summary());
        assert!(output.contains("RUN SUMMARY"));
        assert!(output.contains("TIME TO FIRST BYTE BY STEP"));
        assert!(output.contains("THRESHOLDS"));
        assert!(output.contains("load_login_page"));
        assert!(output.contains("no observations"));
        assert!(output.contains("THRESHOLDS FAILED"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let dir = std::env::temp_dir().join("storepulse-summary-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.json");

        write_json_report(&path, &sample_summary()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["scenario"], "checkout");
        assert_eq!(parsed["passed"], false);
        assert_eq!(parsed["thresholds"]["verdicts"][1]["observations"], 0);
    }
}
