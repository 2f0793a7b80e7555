//! Exit status codes for the CLI
//!
//! storepulse follows standard Unix exit code conventions:
//! - 0: run finished and every configured threshold passed
//! - 1: configuration or runtime error before a verdict could be reached
//! - 10: run finished but at least one threshold failed
//! - 130: user interrupted (Ctrl+C, standard SIGINT exit code)
//!
//! CI pipelines gate on the distinction between 1 and 10: an exit of 10
//! means the target was measured and found too slow, not that the harness
//! itself broke.

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Run completed, all thresholds passed
    Success = 0,
    /// Harness error (bad configuration, runtime failure)
    Error = 1,
    /// Run completed, one or more thresholds failed
    ThresholdFailed = 10,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Create an exit status from a raw exit code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            10 => ExitStatus::ThresholdFailed,
            130 => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}
