//! URL handling module for Price-Ripple
//!
//! This module builds per-platform search URLs: query encoding, location
//! slugs, and resolution of item links found on result pages.

mod encode;
mod resolve;

use crate::listing::Location;

// Re-export main functions
pub use encode::{encode_query, QueryEncoding};
pub use resolve::resolve_link;

/// Placeholder replaced with a location slug in base URL templates
pub const SITE_PLACEHOLDER: &str = "{site}";

/// Builds a location slug from a city name
///
/// The slug is the lowercase city with everything but ASCII letters and
/// digits removed ("San Francisco" becomes "sanfrancisco"). Returns
/// `default` when there is no location or the city has no usable characters.
///
/// # Examples
///
/// ```
/// use price_ripple::listing::Location;
/// use price_ripple::url::location_slug;
///
/// let austin = Location::new("Austin", Some("TX".to_string()));
/// assert_eq!(location_slug(Some(&austin), "sfbay"), "austin");
/// assert_eq!(location_slug(None, "sfbay"), "sfbay");
/// ```
pub fn location_slug(location: Option<&Location>, default: &str) -> String {
    location
        .map(|loc| {
            loc.city
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Substitutes the site slug into a base URL template and trims any trailing
/// slash so paths can be appended directly
pub fn fill_site_template(template: &str, site: &str) -> String {
    template
        .replace(SITE_PLACEHOLDER, site)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_slug_strips_spaces_and_punctuation() {
        let loc = Location::new("St. Louis", Some("MO".to_string()));
        assert_eq!(location_slug(Some(&loc), "x"), "stlouis");

        let loc = Location::new("New York", None);
        assert_eq!(location_slug(Some(&loc), "x"), "newyork");
    }

    #[test]
    fn test_location_slug_falls_back_to_default() {
        let loc = Location::new("---", None);
        assert_eq!(location_slug(Some(&loc), "sanfrancisco"), "sanfrancisco");
        assert_eq!(location_slug(None, "sanfrancisco"), "sanfrancisco");
    }

    #[test]
    fn test_fill_site_template() {
        assert_eq!(
            fill_site_template("https://{site}.craigslist.org", "austin"),
            "https://austin.craigslist.org"
        );
        assert_eq!(
            fill_site_template("http://127.0.0.1:9000/", "austin"),
            "http://127.0.0.1:9000"
        );
    }
}
