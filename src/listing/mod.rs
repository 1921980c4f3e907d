//! Normalized listing records and per-platform result containers
//!
//! Every extractor, whatever the markup or API it reads, produces the types in
//! this module. They are request-scoped and never persisted.

mod status;

pub use status::ExtractionStatus;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of characters kept from a listing title
pub const MAX_TITLE_CHARS: usize = 100;

/// Sentinel for condition/shipping fields absent from the markup
pub const NOT_SPECIFIED: &str = "Not specified";

/// Sentinel for fields that can only be read on the listing page itself
pub const CHECK_LISTING: &str = "Check listing";

/// One normalized marketplace listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Display title, at most [`MAX_TITLE_CHARS`] characters
    pub title: String,

    /// Parsed price; `0.0` means the price could not be determined
    pub price: f64,

    /// Raw price text as shown on the source page
    pub price_text: String,

    /// Condition descriptor or a sentinel
    pub condition: String,

    /// Shipping or pickup descriptor or a sentinel
    pub shipping: String,

    /// Listing URL, or the search page URL when no item link was found
    pub url: String,

    /// Display name of the originating platform
    pub platform: String,

    /// Set on synthesized stand-in records only
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

impl ListingRecord {
    /// Creates a record with sentinel condition/shipping values
    ///
    /// The title is truncated and `price` is derived from `price_text` by the
    /// caller, so the two stay consistent.
    pub fn new(
        title: &str,
        price: f64,
        price_text: &str,
        url: &str,
        platform: &str,
    ) -> Self {
        Self {
            title: truncate_title(title),
            price,
            price_text: price_text.trim().to_string(),
            condition: NOT_SPECIFIED.to_string(),
            shipping: NOT_SPECIFIED.to_string(),
            url: url.to_string(),
            platform: platform.to_string(),
            placeholder: false,
        }
    }

    /// Sets the condition descriptor
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Sets the shipping descriptor
    pub fn with_shipping(mut self, shipping: impl Into<String>) -> Self {
        self.shipping = shipping.into();
        self
    }

    /// Returns true if this record may contribute to price statistics
    pub fn is_comparable(&self) -> bool {
        !self.placeholder && self.price.is_finite() && self.price > 0.0
    }
}

/// Collapses whitespace and truncates a title to [`MAX_TITLE_CHARS`] characters
pub fn truncate_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Shipping descriptor for an item picked up at `location`
///
/// Surrounding parentheses are dropped, so "(mission district)" and
/// "mission district" read the same. Returns None for a blank location.
pub fn local_pickup(location: &str) -> Option<String> {
    let location = location.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
    (!location.is_empty()).then(|| format!("Local pickup ({})", location))
}

/// City and region qualifier for geographically scoped searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: Option<String>,
}

impl Location {
    pub fn new(city: impl Into<String>, state: Option<String>) -> Self {
        Self {
            city: city.into(),
            state,
        }
    }

    /// Human-readable form, e.g. "Austin, TX"
    pub fn display(&self) -> String {
        match &self.state {
            Some(state) if !state.trim().is_empty() => {
                format!("{}, {}", self.city.trim(), state.trim())
            }
            _ => self.city.trim().to_string(),
        }
    }
}

/// A validated search request shared by every extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text query as typed by the user (trimmed)
    pub text: String,

    /// Upper bound on listings returned per platform
    pub max_results: usize,

    /// Optional location qualifier
    pub location: Option<Location>,
}

impl SearchQuery {
    /// Builds a query, rejecting empty text and out-of-range bounds
    ///
    /// # Arguments
    ///
    /// * `text` - The search text
    /// * `max_results` - Per-platform result bound, must be in `1..=limit`
    /// * `limit` - The configured maximum for `max_results`
    ///
    /// # Returns
    ///
    /// * `Ok(SearchQuery)` - A query ready for extraction
    /// * `Err(CompareError::InvalidQuery)` - The input was rejected
    pub fn new(text: &str, max_results: usize, limit: usize) -> crate::Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(crate::CompareError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }

        if max_results == 0 || max_results > limit {
            return Err(crate::CompareError::InvalidQuery(format!(
                "max_results must be between 1 and {}, got {}",
                limit, max_results
            )));
        }

        Ok(Self {
            text: text.to_string(),
            max_results,
            location: None,
        })
    }

    /// Attaches a location qualifier; blank cities are ignored
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location.filter(|loc| !loc.city.trim().is_empty());
        self
    }
}

/// Outcome of one extractor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(flatten)]
    pub status: ExtractionStatus,
    pub listings: Vec<ListingRecord>,
}

impl Extraction {
    /// Genuine listings were found; an empty list downgrades to `Empty`
    pub fn found(listings: Vec<ListingRecord>) -> Self {
        let status = if listings.is_empty() {
            ExtractionStatus::Empty
        } else {
            ExtractionStatus::Ok
        };
        Self { status, listings }
    }

    /// The upstream answered but had nothing to offer
    pub fn empty() -> Self {
        Self {
            status: ExtractionStatus::Empty,
            listings: Vec::new(),
        }
    }

    /// The page was reachable but could not be parsed
    pub fn degraded(reason: impl Into<String>, placeholder: ListingRecord) -> Self {
        Self {
            status: ExtractionStatus::Degraded {
                reason: reason.into(),
            },
            listings: vec![placeholder],
        }
    }

    /// The platform could not be reached at all
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failed {
                reason: reason.into(),
            },
            listings: Vec::new(),
        }
    }
}

/// Per-platform results keyed by platform key, in key order
pub type PlatformResultSet = BTreeMap<String, Extraction>;
