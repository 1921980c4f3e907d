use url::Url;

/// Query parameters that only carry tracking data on listing links
const TRACKING_PARAMS: &[&str] = &[
    "_trksid",
    "_trkparms",
    "amdata",
    "hash",
    "itmmeta",
    "itmprp",
    "epid",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "ref",
    "referral_code",
    "tracking",
];

/// Resolves an item href against the search page URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - unparseable hrefs and non-HTTP(S) results
///
/// Tracking parameters and fragments are stripped from the resolved URL.
///
/// # Examples
///
/// ```
/// use price_ripple::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://www.mercari.com/search/?keyword=lamp").unwrap();
/// assert_eq!(
///     resolve_link("/item/m123/", &base).as_deref(),
///     Some("https://www.mercari.com/item/m123/")
/// );
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut url = base_url.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    strip_tracking(&mut url);
    Some(url.to_string())
}

/// Removes the fragment and tracking query parameters in place
fn strip_tracking(url: &mut Url) {
    url.set_fragment(None);

    if url.query().is_none() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}
