//! Per-platform listing extraction
//!
//! Every marketplace is served by an [`Extractor`]. Markup-based platforms
//! share one [`SiteExtractor`] parameterized by a [`PlatformProfile`];
//! Facebook can alternatively be served by the scraping actor.
//!
//! Extractors never return errors: transport and parse problems are folded
//! into the [`Extraction`] status so one platform cannot fail a comparison.

mod actor;
mod profile;
mod site;
pub mod strategy;

pub use actor::{ActorExtractor, DEFAULT_ACTOR_LOCATION};
pub use profile::{FetchMode, PlatformKind, PlatformProfile, SelectorTable};
pub use site::SiteExtractor;

use crate::config::{Config, Secrets};
use crate::fetch::{ActorClient, RenderProxy};
use crate::listing::{Extraction, SearchQuery};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// A source of listings for one platform
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Platform key, e.g. "ebay"
    fn key(&self) -> &str;

    /// Display name, e.g. "eBay"
    fn name(&self) -> &str;

    /// Searches the platform; at most `query.max_results` listings
    async fn extract(&self, query: &SearchQuery) -> Extraction;
}

/// Builds one extractor per configured platform, in configuration order
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `secrets` - Keys read from the environment
/// * `client` - HTTP client shared by all extractors
///
/// # Returns
///
/// * `Ok(Vec<Arc<dyn Extractor>>)` - The extractors
/// * `Err(ConfigError)` - Unknown platform key, or the actor is enabled
///   without its token
pub fn build_extractors(
    config: &Config,
    secrets: &Secrets,
    client: Client,
) -> Result<Vec<Arc<dyn Extractor>>, ConfigError> {
    let proxy = secrets.proxy_api_key.as_ref().map(|key| {
        RenderProxy::new(
            config.proxy.endpoint.clone(),
            key.clone(),
            Duration::from_secs(config.http.proxy_timeout_secs),
        )
    });

    let mut extractors: Vec<Arc<dyn Extractor>> = Vec::with_capacity(config.search.platforms.len());

    for key in &config.search.platforms {
        let kind = PlatformKind::from_key(key)
            .map_err(|_| ConfigError::Validation(format!("Unknown platform '{}'", key)))?;
        let profile = PlatformProfile::configured(kind, config.platforms.get(kind.key()));

        if kind == PlatformKind::Facebook && config.actor.enabled {
            let token = secrets
                .actor_token
                .clone()
                .ok_or_else(|| ConfigError::MissingSecret(config.actor.token_env.clone()))?;
            let actor = ActorClient::new(client.clone(), config.actor.clone(), token);
            extractors.push(Arc::new(ActorExtractor::new(
                actor,
                profile,
                config.actor.min_price,
                config.actor.max_price,
                config.actor.sort.clone(),
            )));
            continue;
        }

        extractors.push(Arc::new(SiteExtractor::new(
            profile,
            client.clone(),
            proxy.clone(),
        )));
    }

    Ok(extractors)
}
