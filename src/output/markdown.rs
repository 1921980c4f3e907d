//! Markdown report generation
//!
//! Writes a shareable comparison report: overview statistics, the
//! per-platform breakdown, and the sorted listing table.

use crate::listing::{ListingRecord, PlatformResultSet};
use crate::output::summary::ComparisonSummary;
use crate::price::format_price;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to disk
///
/// # Arguments
///
/// * `query` - The search text
/// * `results` - Per-platform results
/// * `listings` - Sorted comparable listings
/// * `summary` - Statistics over `listings`
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(std::io::Error)` - Failed to write the report
pub fn write_markdown_report(
    query: &str,
    results: &PlatformResultSet,
    listings: &[ListingRecord],
    summary: &ComparisonSummary,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(query, results, listings, summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a comparison as markdown
pub fn format_markdown_report(
    query: &str,
    results: &PlatformResultSet,
    listings: &[ListingRecord],
    summary: &ComparisonSummary,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Price Comparison: {}\n\n", query));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Total Results**: {}\n", summary.total_results));
    let stat = |value: Option<f64>| value.map(format_price).unwrap_or_else(|| "n/a".to_string());
    md.push_str(&format!("- **Lowest Price**: {}\n", stat(summary.lowest_price)));
    md.push_str(&format!("- **Highest Price**: {}\n", stat(summary.highest_price)));
    md.push_str(&format!("- **Average Price**: {}\n\n", stat(summary.average_price)));

    md.push_str("## Platforms\n\n");
    md.push_str("| Platform | Status | Listings |\n");
    md.push_str("|----------|--------|----------|\n");
    for (key, extraction) in results {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            key,
            escape_cell(&extraction.status.to_string()),
            extraction.listings.len()
        ));
    }
    md.push('\n');

    if !summary.platform_summary.is_empty() {
        md.push_str("## Average Price by Platform\n\n");
        md.push_str("| Platform | Count | Average |\n");
        md.push_str("|----------|-------|---------|\n");
        for (platform, stats) in &summary.platform_summary {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(platform),
                stats.count,
                format_price(stats.average_price)
            ));
        }
        md.push('\n');
    }

    md.push_str("## Listings\n\n");
    if listings.is_empty() {
        md.push_str("_No comparable listings found._\n");
        return md;
    }

    md.push_str("| # | Price | Title | Condition | Shipping | Platform |\n");
    md.push_str("|---|-------|-------|-----------|----------|----------|\n");
    for (i, record) in listings.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | [{}]({}) | {} | {} | {} |\n",
            i + 1,
            format_price(record.price),
            escape_cell(&record.title),
            record.url,
            escape_cell(&record.condition),
            escape_cell(&record.shipping),
            escape_cell(&record.platform)
        ));
    }

    md
}

/// Escapes characters that would break a table cell or link text
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('[', "\\[")
        .replace(']', "\\]")
}
