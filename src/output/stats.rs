//! Terminal rendering of comparison results

use crate::listing::{ListingRecord, PlatformResultSet};
use crate::output::summary::ComparisonSummary;
use crate::price::format_price;

/// Prints a comparison to stdout
///
/// # Arguments
///
/// * `query` - The search text, for the heading
/// * `results` - Per-platform results, for the status table
/// * `listings` - Sorted comparable listings
/// * `summary` - Statistics over `listings`
pub fn print_summary(
    query: &str,
    results: &PlatformResultSet,
    listings: &[ListingRecord],
    summary: &ComparisonSummary,
) {
    println!("=== Price Comparison: {} ===\n", query);

    println!("Platforms:");
    for (key, extraction) in results {
        println!(
            "  {:<12} {:<30} {} listings",
            key,
            extraction.status.to_string(),
            extraction.listings.len()
        );
    }
    println!();

    if listings.is_empty() {
        println!("No comparable listings found.");
        return;
    }

    println!("Listings (lowest price first):");
    for (i, record) in listings.iter().enumerate() {
        println!(
            "  {:>3}. {:>12}  {}  [{}]",
            i + 1,
            format_price(record.price),
            record.title,
            record.platform
        );
        println!("       {} | {} | {}", record.condition, record.shipping, record.url);
    }
    println!();

    println!("Overview:");
    println!("  Total results: {}", summary.total_results);
    if let (Some(low), Some(high), Some(avg)) =
        (summary.lowest_price, summary.highest_price, summary.average_price)
    {
        println!("  Lowest price:  {}", format_price(low));
        println!("  Highest price: {}", format_price(high));
        println!("  Average price: {}", format_price(avg));
    }
    println!();

    println!("By Platform:");
    for (platform, stats) in &summary.platform_summary {
        println!(
            "  {}: {} listings, average {}",
            platform,
            stats.count,
            format_price(stats.average_price)
        );
    }

    if !summary.degraded_platforms.is_empty() {
        println!();
        println!(
            "Incomplete platforms ({}): {}",
            summary.degraded_platforms.len(),
            summary.degraded_platforms.join(", ")
        );
    }
}
