//! Concurrent fan-out over all configured extractors
//!
//! This module runs one search across every platform at once:
//! - One task per extractor, each under its own deadline
//! - A panicking or stalled extractor yields `Failed` for its platform only
//! - Every configured platform key appears in the result

use crate::config::{Config, Secrets};
use crate::extract::{build_extractors, Extractor};
use crate::fetch::build_http_client;
use crate::listing::{Extraction, PlatformResultSet, SearchQuery};
use crate::CompareError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs searches across all configured platforms
pub struct Aggregator {
    extractors: Vec<Arc<dyn Extractor>>,
    platform_timeout: Duration,
}

impl Aggregator {
    /// Creates an aggregator from explicit extractors
    pub fn new(extractors: Vec<Arc<dyn Extractor>>, platform_timeout: Duration) -> Self {
        Self {
            extractors,
            platform_timeout,
        }
    }

    /// Creates an aggregator with one shared HTTP client for all platforms
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `secrets` - Keys read from the environment
    ///
    /// # Returns
    ///
    /// * `Ok(Aggregator)` - Ready to search
    /// * `Err(CompareError)` - The client or an extractor could not be built
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self, CompareError> {
        let client = build_http_client(&config.http)?;
        let extractors = build_extractors(config, secrets, client)?;

        tracing::info!(
            "Aggregator ready with {} platforms: {}",
            extractors.len(),
            extractors
                .iter()
                .map(|e| e.key())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self::new(
            extractors,
            Duration::from_secs(config.search.platform_timeout_secs),
        ))
    }

    /// Configured platform keys, in configuration order
    pub fn platforms(&self) -> Vec<String> {
        self.extractors.iter().map(|e| e.key().to_string()).collect()
    }

    /// Searches every platform concurrently and waits for all of them
    pub async fn aggregate(&self, query: &SearchQuery) -> PlatformResultSet {
        tracing::info!(
            "Searching {} platforms for '{}' (max {} each)",
            self.extractors.len(),
            query.text,
            query.max_results
        );

        // Pre-filled so a lost task still leaves its key behind
        let mut results: PlatformResultSet = self
            .extractors
            .iter()
            .map(|e| (e.key().to_string(), Extraction::failed("extractor did not report")))
            .collect();

        let handles: Vec<_> = self
            .extractors
            .iter()
            .map(|extractor| {
                let key = extractor.key().to_string();
                let handle = spawn_extraction(Arc::clone(extractor), query.clone(), self.platform_timeout);
                (key, handle)
            })
            .collect();

        for (key, handle) in handles {
            let extraction = join_extraction(&key, handle).await;

            tracing::info!(
                "{}: {} ({} listings)",
                key,
                extraction.status,
                extraction.listings.len()
            );
            results.insert(key, extraction);
        }

        results
    }

    /// Searches a single platform
    ///
    /// # Returns
    ///
    /// * `Ok(Extraction)` - The platform's result, never an error for
    ///   upstream failures
    /// * `Err(CompareError::UnknownPlatform)` - No extractor with that key
    pub async fn search_one(
        &self,
        platform: &str,
        query: &SearchQuery,
    ) -> Result<Extraction, CompareError> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.key().eq_ignore_ascii_case(platform.trim()))
            .ok_or_else(|| CompareError::UnknownPlatform(platform.to_string()))?;

        let handle = spawn_extraction(Arc::clone(extractor), query.clone(), self.platform_timeout);
        Ok(join_extraction(extractor.key(), handle).await)
    }
}

/// Runs one extractor on its own task under `deadline`
fn spawn_extraction(
    extractor: Arc<dyn Extractor>,
    query: SearchQuery,
    deadline: Duration,
) -> JoinHandle<Extraction> {
    tokio::spawn(async move {
        match tokio::time::timeout(deadline, extractor.extract(&query)).await {
            Ok(extraction) => extraction,
            Err(_) => {
                tracing::warn!("{}: no result within {:?}", extractor.name(), deadline);
                Extraction::failed(format!("timed out after {}s", deadline.as_secs()))
            }
        }
    })
}

/// Waits for an extraction task; a panicked task becomes `Failed`
async fn join_extraction(key: &str, handle: JoinHandle<Extraction>) -> Extraction {
    match handle.await {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::error!("{}: extractor task failed: {}", key, e);
            Extraction::failed(format!("extractor task failed: {}", e))
        }
    }
}
