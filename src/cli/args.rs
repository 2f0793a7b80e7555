//! CLI argument definitions using clap
//!
//! Every load-test option has an environment fallback so the harness can
//! be driven from CI variable groups the same way it is driven from a
//! shell.

use clap::{ArgAction, Parser};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::scenario::ScenarioKind;

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "")
        } else {
            write!(f, "[REDACTED]")
        }
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString(s)
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

impl AsRef<str> for SecretString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// storepulse - replay storefront user journeys under load
#[derive(Parser, Debug, Clone)]
#[command(name = "storepulse", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // TARGET & SCENARIO
    // =========================================================================
    /// Journey to replay
    #[arg(long, value_enum, default_value_t = ScenarioKind::Checkout)]
    pub scenario: ScenarioKind,

    /// Target storefront origin, e.g. https://shop.example.com
    #[arg(long, env = "BASE_URL")]
    pub base_url: String,

    // =========================================================================
    // CREDENTIALS & SERVER-SIDE IDENTIFIERS
    // =========================================================================
    /// Customer user for authenticated journeys
    #[arg(long, env = "USERNAME")]
    pub username: Option<String>,

    /// Password for the customer user
    #[arg(long, env = "PASSWORD")]
    pub password: Option<SecretString>,

    /// Existing shopping list that seeds the checkout
    #[arg(long = "shopping-list-id", env = "SL_ID", value_name = "ID")]
    pub shopping_list_id: Option<String>,

    /// Server-side shipping method identifier
    #[arg(long, env = "SHIPPING_METHOD")]
    pub shipping_method: Option<String>,

    /// Server-side payment method identifier
    #[arg(long, env = "PAYMENT_METHOD")]
    pub payment_method: Option<String>,

    // =========================================================================
    // LOAD SHAPE
    // =========================================================================
    /// Concurrent simulated users
    #[arg(long, env = "VU", default_value_t = 1, value_name = "N")]
    pub vus: u32,

    /// Wall-clock test length (e.g. 30s, 5m)
    #[arg(long, env = "DURATION", default_value = "1m", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Think-time floor between steps
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    pub think_time_min: Duration,

    /// Think-time ceiling between steps
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    pub think_time_max: Duration,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30.0, value_name = "SECONDS")]
    pub timeout: f64,

    // =========================================================================
    // THRESHOLDS & REPORTING
    // =========================================================================
    /// p95 latency bound in milliseconds applied to every step series
    #[arg(long = "threshold-95", env = "THRESHOLD_95", value_name = "MS")]
    pub threshold_95: Option<f64>,

    /// Average latency bound in milliseconds
    #[arg(long = "threshold-avg", env = "THRESHOLD_AVG", value_name = "MS")]
    pub threshold_avg: Option<f64>,

    /// Write the end-of-run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report_json: Option<PathBuf>,

    /// Force disable colors in output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacts_debug() {
        let secret = SecretString("hunter2".to_string());
        assert_eq!(format!("{:?}", secret), "SecretString(\"[REDACTED]\")");
        assert_eq!(secret.as_str(), "hunter2");
    }

    #[test]
    fn test_parse_scenario_and_load_shape() {
        let args = Args::try_parse_from([
            "storepulse",
            "--base-url",
            "https://shop.test",
            "--scenario",
            "warmup",
            "--vus",
            "25",
            "--duration",
            "90s",
        ])
        .unwrap();
        assert_eq!(args.scenario, ScenarioKind::Warmup);
        assert_eq!(args.vus, 25);
        assert_eq!(args.duration, Duration::from_secs(90));
    }

    #[test]
    fn test_parse_think_time() {
        let args = Args::try_parse_from([
            "storepulse",
            "--base-url",
            "https://shop.test",
            "--think-time-min",
            "100ms",
            "--think-time-max",
            "250ms",
        ])
        .unwrap();
        assert_eq!(args.think_time_min, Duration::from_millis(100));
        assert_eq!(args.think_time_max, Duration::from_millis(250));
    }
}
