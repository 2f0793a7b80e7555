use clap::Parser;

use storepulse::cli::Args;
use storepulse::status::ExitStatus;
use storepulse::{core, signals};

/// Entry point - installs the Ctrl+C handler and dispatches to core::run().
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    // First Ctrl+C asks for a graceful stop: no new iterations, summary
    // still printed. A second Ctrl+C force-exits.
    ctrlc::set_handler(move || {
        if signals::interrupted() {
            std::process::exit(ExitStatus::Interrupted as i32);
        }
        signals::request_stop();
        eprintln!("\nInterrupted - finishing in-flight steps");
    })
    .ok();

    let args = Args::parse();
    let status = core::run(args);

    if signals::interrupted() {
        return ExitStatus::Interrupted;
    }
    status
}
