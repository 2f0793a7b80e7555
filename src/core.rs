//! Run orchestration
//!
//! Validates the configuration, builds the selected scenario and its
//! threshold map, drives the load run on a tokio runtime, and turns the
//! recorded metrics into the summary, the optional JSON report, and the
//! process exit status.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::errors::{Result, StorepulseError};
use crate::metrics::{MetricRegistry, CHECK_FAILURE_SERIES};
use crate::output::terminal;
use crate::output::{format_summary, write_json_report, RunSummary};
use crate::runner::{LoadOptions, ThinkTime};
use crate::scenario::{self, ScenarioConfig, ScenarioKind};
use crate::signals;
use crate::status::ExitStatus;

/// Main entry point for the CLI.
pub fn run(args: Args) -> ExitStatus {
    init_tracing();
    terminal::set_colors(terminal::detect_colors(args.no_color));

    match execute(args) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{} {}", terminal::error("error:"), err);
            ExitStatus::Error
        }
    }
}

fn execute(args: Args) -> Result<ExitStatus> {
    let config = build_scenario_config(&args)?;
    let load_options = build_load_options(&args)?;

    let scenario = Arc::new(scenario::build(args.scenario, &config));
    let thresholds = scenario.threshold_map(args.threshold_95, args.threshold_avg);
    if thresholds.is_empty() {
        eprintln!(
            "{}",
            terminal::muted("No thresholds configured; the run will always pass.")
        );
    }

    eprintln!(
        "{} {} against {} (vus: {}, duration: {})",
        terminal::info("Replaying"),
        terminal::colorize(scenario.name, terminal::colors::AQUA),
        terminal::colorize(&config.base_url, terminal::colors::AQUA),
        terminal::number(&load_options.vus.to_string()),
        terminal::number(&humantime::format_duration(load_options.duration).to_string()),
    );

    let registry = Arc::new(MetricRegistry::new());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let started_at = Utc::now();
    let start = Instant::now();
    let totals = runtime.block_on(crate::runner::run(
        scenario.clone(),
        registry.clone(),
        load_options,
    ));
    let elapsed = start.elapsed();

    let report = crate::metrics::evaluate(&registry, &thresholds);
    let summary = RunSummary {
        scenario: scenario.name.to_string(),
        base_url: config.base_url.clone(),
        vus: load_options.vus,
        started_at,
        finished_at: Utc::now(),
        elapsed_secs: elapsed.as_secs_f64(),
        totals,
        series: registry.all_timing_stats(),
        check_failure: registry.rate(CHECK_FAILURE_SERIES),
        passed: report.passed(),
        thresholds: report,
    };

    print!("{}", format_summary(&summary));

    if let Some(path) = &args.report_json {
        write_json_report(path, &summary)?;
        eprintln!("JSON report written to: {}", path.display());
    }

    if signals::interrupted() {
        return Ok(ExitStatus::Interrupted);
    }
    if summary.passed {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::ThresholdFailed)
    }
}

/// Validate per-scenario requirements and assemble the scenario data.
fn build_scenario_config(args: &Args) -> Result<ScenarioConfig> {
    // Parse to validate, keep the trimmed string for template assembly.
    let parsed = url::Url::parse(&args.base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StorepulseError::Argument(format!(
            "base URL must be http(s), got `{}`",
            args.base_url
        )));
    }
    let base_url = args.base_url.trim_end_matches('/').to_string();

    let scenario_name = match args.scenario {
        ScenarioKind::Checkout => "checkout",
        ScenarioKind::Storefront => "storefront",
        ScenarioKind::Warmup => "warmup",
    };

    let needs_credentials = matches!(args.scenario, ScenarioKind::Checkout | ScenarioKind::Storefront);
    let username = if needs_credentials {
        required(args.username.clone(), "--username", "USERNAME", scenario_name)?
    } else {
        String::new()
    };
    let password = if needs_credentials {
        required(
            args.password.clone().map(|p| p.into_inner()),
            "--password",
            "PASSWORD",
            scenario_name,
        )?
    } else {
        String::new()
    };

    let (shopping_list_id, shipping_method, payment_method) = match args.scenario {
        ScenarioKind::Checkout => (
            required(args.shopping_list_id.clone(), "--shopping-list-id", "SL_ID", scenario_name)?,
            required(args.shipping_method.clone(), "--shipping-method", "SHIPPING_METHOD", scenario_name)?,
            required(args.payment_method.clone(), "--payment-method", "PAYMENT_METHOD", scenario_name)?,
        ),
        _ => (String::new(), String::new(), String::new()),
    };

    Ok(ScenarioConfig {
        base_url,
        username,
        password,
        shopping_list_id,
        shipping_method,
        payment_method,
    })
}

fn build_load_options(args: &Args) -> Result<LoadOptions> {
    if args.vus == 0 {
        return Err(StorepulseError::Argument(
            "--vus (VU) must be at least 1".to_string(),
        ));
    }
    if args.timeout <= 0.0 {
        return Err(StorepulseError::Argument(
            "--timeout must be positive".to_string(),
        ));
    }
    if args.think_time_min > args.think_time_max {
        return Err(StorepulseError::Argument(format!(
            "--think-time-min ({:?}) exceeds --think-time-max ({:?})",
            args.think_time_min, args.think_time_max
        )));
    }

    Ok(LoadOptions {
        vus: args.vus,
        duration: args.duration,
        request_timeout: Duration::from_secs_f64(args.timeout),
        think: ThinkTime {
            floor: args.think_time_min,
            ceiling: args.think_time_max,
        },
    })
}

fn required(value: Option<String>, flag: &str, env: &str, scenario: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorepulseError::Argument(format!(
            "{flag} ({env}) is required for the {scenario} scenario"
        ))),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storepulse=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Parse and then clear the credential-shaped fields so ambient
    /// environment variables (USERNAME is often set) cannot leak into the
    /// assertions.
    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["storepulse", "--base-url", "https://shop.test"];
        argv.extend_from_slice(extra);
        let mut args = Args::try_parse_from(argv).unwrap();
        args.username = None;
        args.password = None;
        args.shopping_list_id = None;
        args.shipping_method = None;
        args.payment_method = None;
        args
    }

    #[test]
    fn test_warmup_needs_no_credentials() {
        let args = parse(&["--scenario", "warmup"]);
        let config = build_scenario_config(&args).unwrap();
        assert_eq!(config.base_url, "https://shop.test");
        assert!(config.username.is_empty());
    }

    #[test]
    fn test_checkout_requires_shopping_list() {
        let mut args = parse(&["--scenario", "checkout"]);
        args.username = Some("amanda@example.com".to_string());
        args.password = Some(crate::cli::SecretString("secret".to_string()));
        let err = build_scenario_config(&args).unwrap_err();
        assert!(err.to_string().contains("--shopping-list-id"));
    }

    #[test]
    fn test_storefront_requires_credentials() {
        let args = parse(&["--scenario", "storefront"]);
        let err = build_scenario_config(&args).unwrap_err();
        assert!(err.to_string().contains("--username"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let mut args = parse(&["--scenario", "warmup"]);
        args.base_url = "https://shop.test/".to_string();
        let config = build_scenario_config(&args).unwrap();
        assert_eq!(config.base_url, "https://shop.test");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut args = parse(&["--scenario", "warmup"]);
        args.base_url = "ftp://shop.test".to_string();
        assert!(build_scenario_config(&args).is_err());
    }

    #[test]
    fn test_load_options_validation() {
        let mut args = parse(&["--scenario", "warmup"]);
        args.vus = 0;
        assert!(build_load_options(&args).is_err());

        let mut args = parse(&["--scenario", "warmup"]);
        args.think_time_min = Duration::from_secs(5);
        args.think_time_max = Duration::from_secs(2);
        assert!(build_load_options(&args).is_err());
    }
}
