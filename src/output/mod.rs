//! Output module for comparison results
//!
//! This module handles:
//! - Merging per-platform results and computing price statistics
//! - Printing a comparison to the terminal
//! - Writing markdown reports

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::print_summary;
pub use summary::{summarize, ComparisonSummary, PlatformStats};
