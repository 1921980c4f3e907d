//! Render-capable fetch proxy client
//!
//! JavaScript-heavy marketplaces return an empty shell to plain HTTP clients.
//! The proxy fetches the target page on our behalf, optionally executing its
//! scripts first, and returns the resulting HTML.

use crate::fetch::client::{classify, FetchResult};
use reqwest::Client;
use std::time::Duration;

/// Connection details for the render proxy
#[derive(Debug, Clone)]
pub struct RenderProxy {
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl RenderProxy {
    /// Creates a proxy handle
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Proxy URL accepting `api_key`, `url` and `render` parameters
    /// * `api_key` - Key read from the environment at startup
    /// * `timeout` - Per-request timeout, longer than a direct fetch since
    ///   rendering is slow
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Fetches `target_url` through the proxy
    pub async fn fetch(&self, client: &Client, target_url: &str, render: bool) -> FetchResult {
        tracing::debug!("Fetching {} via render proxy (render={})", target_url, render);

        let request = client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", target_url),
                ("render", if render { "true" } else { "false" }),
            ])
            .timeout(self.timeout);

        classify(request.send().await).await
    }
}
