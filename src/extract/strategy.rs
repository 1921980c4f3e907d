//! Listing extraction strategies
//!
//! A strategy turns a parsed search page into listing records, or gives up
//! with `None`. Strategies are pure and tried in order:
//! 1. **structural** - the platform's container selectors, first match wins
//! 2. **heuristic** - currency-marked text fragments, walked up to the
//!    enclosing item container
//!
//! The first strategy producing at least one record decides the result.

use crate::extract::profile::PlatformProfile;
use crate::listing::{local_pickup, ListingRecord};
use crate::price::{is_bare_price, looks_like_price, normalize_price};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// How far up the tree the heuristic looks for an item container
const MAX_ANCESTOR_DEPTH: usize = 8;

/// Price fragments longer than this are prose, not prices
const MAX_PRICE_FRAGMENT_CHARS: usize = 40;

/// Per-request inputs shared by all strategies
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// The search page URL, used to resolve links and as a fallback item URL
    pub search_url: Url,

    /// Upper bound on records returned
    pub max_results: usize,
}

/// A named extraction strategy
pub type Strategy = fn(&Html, &PlatformProfile, &ParseContext) -> Option<Vec<ListingRecord>>;

/// Strategies in the order they are tried
pub const STRATEGIES: [(&str, Strategy); 2] = [("structural", structural), ("heuristic", heuristic)];

/// Parses a search page into listing records
///
/// Returns an empty vector when no strategy finds anything.
pub fn parse_listings(html: &str, profile: &PlatformProfile, ctx: &ParseContext) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);

    for (name, strategy) in STRATEGIES {
        if let Some(records) = strategy(&document, profile, ctx) {
            tracing::debug!(
                "{}: {} strategy produced {} records",
                profile.name(),
                name,
                records.len()
            );
            return records;
        }
        tracing::debug!("{}: {} strategy found nothing", profile.name(), name);
    }

    Vec::new()
}

/// Uses the first container selector that matches at least one element
pub fn structural(
    document: &Html,
    profile: &PlatformProfile,
    ctx: &ParseContext,
) -> Option<Vec<ListingRecord>> {
    for container in profile.selectors.containers {
        let Ok(selector) = Selector::parse(container) else {
            tracing::warn!("Invalid container selector '{}'", container);
            continue;
        };

        let items: Vec<ElementRef> = document.select(&selector).collect();
        if items.is_empty() {
            continue;
        }

        tracing::debug!(
            "{}: selector '{}' matched {} items",
            profile.name(),
            container,
            items.len()
        );

        let records: Vec<ListingRecord> = items
            .into_iter()
            .filter_map(|item| extract_item(item, profile, ctx))
            .take(ctx.max_results)
            .collect();

        return (!records.is_empty()).then_some(records);
    }

    None
}

/// Scans for currency-marked text and walks up to the enclosing item
pub fn heuristic(
    document: &Html,
    profile: &PlatformProfile,
    ctx: &ParseContext,
) -> Option<Vec<ListingRecord>> {
    let mut seen: Vec<ElementRef> = Vec::new();
    let mut records = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let fragment = text.trim();
        if fragment.chars().count() > MAX_PRICE_FRAGMENT_CHARS || !is_bare_price(fragment) {
            continue;
        }

        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if matches!(parent.value().name(), "script" | "style" | "noscript") {
            continue;
        }

        let Some(container) = enclosing_container(parent) else {
            continue;
        };

        if seen.contains(&container) {
            continue;
        }
        seen.push(container);

        if let Some(record) = heuristic_item(container, fragment, profile, ctx) {
            records.push(record);
            if records.len() >= ctx.max_results {
                break;
            }
        }
    }

    (!records.is_empty()).then_some(records)
}

/// Extracts one record from a structurally matched container
///
/// Returns None for items without a title or readable price, and for
/// promotional artifacts.
fn extract_item(
    item: ElementRef,
    profile: &PlatformProfile,
    ctx: &ParseContext,
) -> Option<ListingRecord> {
    let selectors = &profile.selectors;

    let title = first_text_where(item, selectors.title, |text| !is_bare_price(text))?;
    if profile.is_artifact(&title) {
        tracing::trace!("{}: skipping artifact '{}'", profile.name(), title);
        return None;
    }

    let price_text = first_text_where(item, selectors.price, looks_like_price)
        .or_else(|| first_text_where(item, selectors.price, |text| normalize_price(text) > 0.0))
        .or_else(|| first_text(item, selectors.price))?;
    let price = normalize_price(&price_text);
    if price == 0.0 {
        tracing::trace!("{}: unparseable price '{}'", profile.name(), price_text);
        return None;
    }

    Some(finish_record(item, &title, price, &price_text, profile, ctx))
}

/// Extracts one record from a container found by the heuristic
fn heuristic_item(
    container: ElementRef,
    price_fragment: &str,
    profile: &PlatformProfile,
    ctx: &ParseContext,
) -> Option<ListingRecord> {
    let title = first_text_where(container, profile.selectors.title, |text| !is_bare_price(text))
        .or_else(|| {
            container
                .text()
                .map(str::trim)
                .find(|text| text.chars().count() >= 3 && !is_bare_price(text))
                .map(str::to_string)
        })?;

    if profile.is_artifact(&title) {
        return None;
    }

    let price = normalize_price(price_fragment);
    Some(finish_record(container, &title, price, price_fragment, profile, ctx))
}

/// Fills in link, condition and shipping around a title and price
fn finish_record(
    item: ElementRef,
    title: &str,
    price: f64,
    price_text: &str,
    profile: &PlatformProfile,
    ctx: &ParseContext,
) -> ListingRecord {
    let selectors = &profile.selectors;

    let url = first_href(item, selectors.link)
        .and_then(|href| resolve_link(&href, &ctx.search_url))
        .unwrap_or_else(|| ctx.search_url.to_string());

    let condition = first_text(item, selectors.condition)
        .unwrap_or_else(|| profile.default_condition.to_string());

    let shipping = match first_text(item, selectors.shipping) {
        Some(shipping) => shipping,
        None if profile.local_pickup => first_text(item, selectors.location)
            .and_then(|location| local_pickup(&location))
            .unwrap_or_else(|| profile.default_shipping.to_string()),
        None => profile.default_shipping.to_string(),
    };

    ListingRecord::new(title, price, price_text, &url, profile.name())
        .with_condition(condition)
        .with_shipping(shipping)
}

/// Returns the first non-empty text across an ordered selector list
pub fn first_text(item: ElementRef, selectors: &[&str]) -> Option<String> {
    first_text_where(item, selectors, |_| true)
}

/// Returns the first non-empty text accepted by `accept`
///
/// `img[alt]` candidates contribute their alt text.
pub fn first_text_where<F>(item: ElementRef, selectors: &[&str], accept: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    for candidate in selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };

        for element in item.select(&selector) {
            let text = element_text(element);
            if !text.is_empty() && accept(&text) {
                return Some(text);
            }
        }
    }

    None
}

/// Returns the href of the item itself, a matching descendant, or the
/// nearest linking ancestor
pub fn first_href(item: ElementRef, selectors: &[&str]) -> Option<String> {
    if let Some(href) = item.value().attr("href") {
        return Some(href.to_string());
    }

    for candidate in selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };

        if let Some(href) = item
            .select(&selector)
            .find_map(|element| element.value().attr("href"))
        {
            return Some(href.to_string());
        }
    }

    item.ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_ANCESTOR_DEPTH)
        .find_map(|element| {
            (element.value().name() == "a")
                .then(|| element.value().attr("href"))
                .flatten()
        })
        .map(str::to_string)
}

/// Collapsed text content of an element
fn element_text(element: ElementRef) -> String {
    if element.value().name() == "img" {
        return element
            .value()
            .attr("alt")
            .map(|alt| alt.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
    }

    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Finds the element that most plausibly wraps one listing
///
/// Prefers list items, articles and links; falls back to the nearest
/// ancestor that contains a link at all.
fn enclosing_container(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let ancestors: Vec<ElementRef> = std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .take_while(|el| !matches!(el.value().name(), "body" | "html"))
        .take(MAX_ANCESTOR_DEPTH)
        .collect();

    if let Some(container) = ancestors.iter().find(|el| is_item_container(el)) {
        return Some(*container);
    }

    let link = Selector::parse("a[href]").ok()?;
    ancestors
        .into_iter()
        .find(|el| el.select(&link).next().is_some())
}

fn is_item_container(element: &ElementRef) -> bool {
    let value = element.value();
    match value.name() {
        "li" | "article" => true,
        "a" => value.attr("href").is_some(),
        _ => {
            value.attr("role") == Some("article")
                || value
                    .attr("data-testid")
                    .is_some_and(|id| id.to_ascii_lowercase().contains("item"))
        }
    }
}
