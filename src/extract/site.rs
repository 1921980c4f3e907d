//! Markup extractor shared by every platform profile

use crate::extract::profile::{FetchMode, PlatformProfile};
use crate::extract::strategy::{parse_listings, ParseContext};
use crate::extract::Extractor;
use crate::fetch::{fetch_page, FetchResult, RenderProxy};
use crate::listing::{Extraction, ListingRecord, SearchQuery, CHECK_LISTING};
use crate::price::format_price;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Fetches a platform's search page and parses it with the profile's selectors
pub struct SiteExtractor {
    profile: PlatformProfile,
    client: Client,
    proxy: Option<RenderProxy>,
}

impl SiteExtractor {
    /// Creates an extractor
    ///
    /// # Arguments
    ///
    /// * `profile` - Platform profile, possibly with configured overrides
    /// * `client` - Shared HTTP client
    /// * `proxy` - Render proxy, or None when no proxy key is configured
    pub fn new(profile: PlatformProfile, client: Client, proxy: Option<RenderProxy>) -> Self {
        if matches!(profile.fetch_mode, FetchMode::Proxy { .. }) && proxy.is_none() {
            tracing::warn!(
                "{}: no render proxy key configured, falling back to direct fetches",
                profile.name()
            );
        }

        Self {
            profile,
            client,
            proxy,
        }
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        match (self.profile.fetch_mode, &self.proxy) {
            (FetchMode::Proxy { render }, Some(proxy)) => proxy.fetch(&self.client, url, render).await,
            _ => fetch_page(&self.client, url).await,
        }
    }

    /// Stand-in record returned when a reachable page yields no listings
    fn placeholder(&self, query: &SearchQuery, search_url: &str) -> ListingRecord {
        let price = self.profile.placeholder_price;
        let mut record = ListingRecord::new(
            &format!("{} - Check {} directly", query.text, self.profile.name()),
            price,
            &format_price(price),
            search_url,
            &format!("{} (parsing needs update)", self.profile.name()),
        )
        .with_condition(CHECK_LISTING)
        .with_shipping(CHECK_LISTING);
        record.placeholder = true;
        record
    }
}

#[async_trait]
impl Extractor for SiteExtractor {
    fn key(&self) -> &str {
        self.profile.key()
    }

    fn name(&self) -> &str {
        self.profile.name()
    }

    async fn extract(&self, query: &SearchQuery) -> Extraction {
        let search_url = self.profile.search_url(query);
        tracing::debug!("{}: searching {}", self.profile.name(), search_url);

        let context = match Url::parse(&search_url) {
            Ok(url) => ParseContext {
                search_url: url,
                max_results: query.max_results,
            },
            Err(e) => {
                tracing::warn!("{}: invalid search URL {}: {}", self.profile.name(), search_url, e);
                return Extraction::failed(format!("invalid search URL: {}", e));
            }
        };

        let body = match self.fetch(&search_url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                tracing::debug!(
                    "{}: HTTP {} from {}",
                    self.profile.name(),
                    status_code,
                    final_url
                );
                body
            }
            failure => {
                let reason = failure
                    .failure_reason()
                    .unwrap_or_else(|| "fetch failed".to_string());
                tracing::warn!("{}: fetch failed: {}", self.profile.name(), reason);
                return Extraction::failed(reason);
            }
        };

        let listings = parse_listings(&body, &self.profile, &context);
        if listings.is_empty() {
            tracing::warn!(
                "{}: page fetched but no listings parsed, returning placeholder",
                self.profile.name()
            );
            return Extraction::degraded(
                "no listings recognised in page markup",
                self.placeholder(query, &search_url),
            );
        }

        tracing::info!("{}: found {} listings", self.profile.name(), listings.len());
        Extraction::found(listings)
    }
}
