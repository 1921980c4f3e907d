//! HTTP fetcher implementation
//!
//! This module handles direct page requests, including:
//! - Building a client that presents a realistic browser header set
//! - Bounded timeouts and redirect following
//! - Classification of transport and status failures

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Describes why the fetch did not succeed
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with a browser-like identity
///
/// The client carries the configured user agent plus the Accept,
/// Accept-Language and Upgrade-Insecure-Requests headers a desktop browser
/// sends, follows up to `max_redirects` redirects and applies the direct
/// fetch timeout. Proxy fetches override the timeout per request.
///
/// # Example
///
/// ```no_run
/// use price_ripple::config::HttpConfig;
/// use price_ripple::fetch::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page directly
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | Success with body |
/// | Any other HTTP status | HttpError |
/// | Timeout | NetworkError ("Request timeout") |
/// | Connection refused, body read failure | NetworkError |
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    tracing::debug!("Fetching {}", url);
    classify(client.get(url).send().await).await
}

/// Turns a send result into a [`FetchResult`]
pub(crate) async fn classify(sent: Result<Response, reqwest::Error>) -> FetchResult {
    match sent {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            // Anything but 200 is treated as a blocked or broken page
            if status != StatusCode::OK {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: format!("Failed to read body: {}", e),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}
