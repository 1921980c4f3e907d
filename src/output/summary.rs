//! Merging per-platform results and computing price statistics

use crate::listing::{ListingRecord, PlatformResultSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Listing count and mean price for one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub count: usize,
    pub average_price: f64,
}

/// Price statistics over the merged, filtered listings
///
/// The price fields are None whenever no comparable listing was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub lowest_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub average_price: Option<f64>,
    pub total_results: usize,

    /// Keyed by platform display name
    pub platform_summary: BTreeMap<String, PlatformStats>,

    /// Keys of platforms whose extraction status is not `ok`
    pub degraded_platforms: Vec<String>,

    pub generated_at: DateTime<Utc>,
}

/// Flattens a result set and computes statistics over it
///
/// Records are taken in platform-key order, then extraction order. Placeholder
/// records and records without a positive price are dropped. The remaining
/// records are sorted by ascending price; the sort is stable, so equal prices
/// keep their relative order.
///
/// # Arguments
///
/// * `results` - Per-platform extraction results
///
/// # Returns
///
/// The sorted comparable listings and their summary
pub fn summarize(results: &PlatformResultSet) -> (Vec<ListingRecord>, ComparisonSummary) {
    let mut listings: Vec<ListingRecord> = results
        .values()
        .flat_map(|extraction| extraction.listings.iter())
        .filter(|record| record.is_comparable())
        .cloned()
        .collect();

    listings.sort_by(|a, b| a.price.total_cmp(&b.price));

    let degraded_platforms: Vec<String> = results
        .iter()
        .filter(|(_, extraction)| !extraction.status.is_ok())
        .map(|(key, _)| key.clone())
        .collect();

    let summary = if listings.is_empty() {
        ComparisonSummary {
            lowest_price: None,
            highest_price: None,
            average_price: None,
            total_results: 0,
            platform_summary: BTreeMap::new(),
            degraded_platforms,
            generated_at: Utc::now(),
        }
    } else {
        let total: f64 = listings.iter().map(|r| r.price).sum();

        ComparisonSummary {
            lowest_price: listings.first().map(|r| r.price),
            highest_price: listings.last().map(|r| r.price),
            average_price: Some(total / listings.len() as f64),
            total_results: listings.len(),
            platform_summary: platform_stats(&listings),
            degraded_platforms,
            generated_at: Utc::now(),
        }
    };

    (listings, summary)
}

fn platform_stats(listings: &[ListingRecord]) -> BTreeMap<String, PlatformStats> {
    let mut totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for record in listings {
        let entry = totals.entry(record.platform.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.price;
    }

    totals
        .into_iter()
        .map(|(platform, (count, sum))| {
            (
                platform,
                PlatformStats {
                    count,
                    average_price: sum / count as f64,
                },
            )
        })
        .collect()
}
