//! Terminal styling and end-of-run reporting

pub mod summary;
pub mod terminal;

pub use summary::{format_summary, write_json_report, RunSummary};
