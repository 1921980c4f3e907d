//! Facebook Marketplace extraction through the scraping actor

use crate::extract::profile::{PlatformKind, PlatformProfile};
use crate::extract::Extractor;
use crate::fetch::{ActorClient, ActorItem, ActorOutcome, ActorSearch};
use crate::listing::{local_pickup, Extraction, ListingRecord, SearchQuery, NOT_SPECIFIED};
use crate::price::normalize_price;
use crate::url::resolve_link;
use async_trait::async_trait;
use url::Url;

/// Location submitted when the query carries none
pub const DEFAULT_ACTOR_LOCATION: &str = "San Francisco, CA";

/// Reads already-structured listings from an actor run
pub struct ActorExtractor {
    actor: ActorClient,
    profile: PlatformProfile,
    min_price: Option<u32>,
    max_price: Option<u32>,
    sort: String,
}

impl ActorExtractor {
    pub fn new(
        actor: ActorClient,
        profile: PlatformProfile,
        min_price: Option<u32>,
        max_price: Option<u32>,
        sort: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(profile.kind, PlatformKind::Facebook);
        Self {
            actor,
            profile,
            min_price,
            max_price,
            sort: sort.into(),
        }
    }

    fn search_for(&self, query: &SearchQuery) -> ActorSearch {
        ActorSearch {
            search_query: query.text.clone(),
            max_items: query.max_results,
            location: query
                .location
                .as_ref()
                .map(|loc| loc.display())
                .unwrap_or_else(|| DEFAULT_ACTOR_LOCATION.to_string()),
            min_price: self.min_price,
            max_price: self.max_price,
            sort: self.sort.clone(),
        }
    }

    /// Maps one dataset item to a record
    ///
    /// Items without a title or a readable price are dropped.
    fn to_record(&self, item: &ActorItem, search_url: &str) -> Option<ListingRecord> {
        let title = item.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let price_text = item.price_text()?;
        let price = normalize_price(&price_text);
        if price == 0.0 {
            return None;
        }

        let url = match (item.url.as_deref(), Url::parse(search_url)) {
            (Some(href), Ok(base)) => resolve_link(href, &base),
            _ => None,
        }
        .unwrap_or_else(|| search_url.to_string());

        let shipping = item
            .location
            .as_deref()
            .and_then(local_pickup)
            .unwrap_or_else(|| self.profile.default_shipping.to_string());

        let condition = item
            .condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(NOT_SPECIFIED);

        Some(
            ListingRecord::new(title, price, &price_text, &url, self.profile.name())
                .with_condition(condition)
                .with_shipping(shipping),
        )
    }
}

#[async_trait]
impl Extractor for ActorExtractor {
    fn key(&self) -> &str {
        self.profile.key()
    }

    fn name(&self) -> &str {
        self.profile.name()
    }

    async fn extract(&self, query: &SearchQuery) -> Extraction {
        let search_url = self.profile.search_url(query);
        let search = self.search_for(query);

        match self.actor.run(&search).await {
            Ok(ActorOutcome::Items(items)) => {
                let listings: Vec<ListingRecord> = items
                    .iter()
                    .filter_map(|item| self.to_record(item, &search_url))
                    .take(query.max_results)
                    .collect();
                tracing::info!("{}: actor returned {} listings", self.name(), listings.len());
                Extraction::found(listings)
            }
            Ok(ActorOutcome::Unsuccessful(status)) => {
                tracing::warn!("{}: actor run ended as {:?}", self.name(), status);
                Extraction::empty()
            }
            Ok(ActorOutcome::TimedOut) => {
                tracing::warn!(
                    "{}: actor run exceeded {:?}",
                    self.name(),
                    self.actor.max_wait()
                );
                Extraction::empty()
            }
            Err(e) => {
                tracing::warn!("{}: actor request failed: {}", self.name(), e);
                Extraction::failed(e.to_string())
            }
        }
    }
}
