//! Job-based scraping actor client
//!
//! The actor accepts a structured search, runs it asynchronously, and stores
//! already-parsed items in a dataset. A run is driven in three steps:
//! 1. Submit the run and receive its run and dataset identifiers
//! 2. Poll the run status on a fixed interval, up to a bounded number of polls
//! 3. On success, download the dataset items

use crate::config::ActorConfig;
use crate::CompareError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Structured search submitted to the actor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSearch {
    pub search_query: String,
    pub max_items: usize,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    pub sort: String,
}

/// Lifecycle state of an actor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns true if the run will not change state again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::TimedOut | Self::Aborted
        )
    }
}

/// One already-parsed item from the actor's dataset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorItem {
    #[serde(default, alias = "marketplace_listing_title")]
    pub title: Option<String>,

    /// Either a string ("$150"), a number, or an object with a formatted amount
    #[serde(default, alias = "listing_price")]
    pub price: Option<serde_json::Value>,

    #[serde(default)]
    pub condition: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default, alias = "listingUrl")]
    pub url: Option<String>,
}

impl ActorItem {
    /// Renders the price field as display text
    pub fn price_text(&self) -> Option<String> {
        use serde_json::Value;

        match self.price.as_ref()? {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Number(number) => Some(format!("${}", number)),
            Value::Object(fields) => ["formatted_amount", "formattedAmount", "amount"]
                .iter()
                .find_map(|key| match fields.get(*key)? {
                    Value::String(text) => Some(text.trim().to_string()),
                    Value::Number(number) => Some(format!("${}", number)),
                    _ => None,
                }),
            _ => None,
        }
    }
}

/// How an actor run ended
#[derive(Debug)]
pub enum ActorOutcome {
    /// The run succeeded; its dataset items
    Items(Vec<ActorItem>),
    /// The run reached a terminal failure state
    Unsuccessful(RunStatus),
    /// The run did not finish within the polling budget
    TimedOut,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunInfo {
    id: String,
    default_dataset_id: String,
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct RunState {
    status: RunStatus,
}

/// Client for one actor, authenticated with an environment-sourced token
#[derive(Debug, Clone)]
pub struct ActorClient {
    client: Client,
    config: ActorConfig,
    token: String,
}

impl ActorClient {
    pub fn new(client: Client, config: ActorConfig, token: impl Into<String>) -> Self {
        Self {
            client,
            config,
            token: token.into(),
        }
    }

    /// Total time a run may take before it is abandoned
    pub fn max_wait(&self) -> Duration {
        self.poll_interval() * self.config.max_polls
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Submits a search and waits for its results
    ///
    /// # Returns
    ///
    /// * `Ok(ActorOutcome)` - The run finished, failed, or ran out of polls
    /// * `Err(CompareError)` - A transport or decoding error occurred
    pub async fn run(&self, search: &ActorSearch) -> Result<ActorOutcome, CompareError> {
        let run = self.submit(search).await?;
        tracing::info!(
            "Actor run {} submitted (dataset {}, status {:?})",
            run.id,
            run.default_dataset_id,
            run.status
        );

        let mut status = run.status;
        let mut polls = 0;

        while !status.is_terminal() {
            if polls >= self.config.max_polls {
                tracing::warn!(
                    "Actor run {} still {:?} after {:?}, giving up",
                    run.id,
                    status,
                    self.max_wait()
                );
                return Ok(ActorOutcome::TimedOut);
            }

            tokio::time::sleep(self.poll_interval()).await;
            status = self.poll(&run.id).await?;
            polls += 1;
            tracing::debug!("Actor run {} poll {}: {:?}", run.id, polls, status);
        }

        if status != RunStatus::Succeeded {
            tracing::warn!("Actor run {} ended with status {:?}", run.id, status);
            return Ok(ActorOutcome::Unsuccessful(status));
        }

        let items = self.dataset_items(&run.default_dataset_id).await?;
        tracing::info!("Actor run {} returned {} items", run.id, items.len());
        Ok(ActorOutcome::Items(items))
    }

    async fn submit(&self, search: &ActorSearch) -> Result<RunInfo, CompareError> {
        let url = format!("{}/acts/{}/runs", self.base_url(), self.config.actor_id);
        let response = self
            .client
            .post(&url)
            .query(&[("token", self.token.as_str())])
            .json(search)
            .send()
            .await
            .map_err(|source| CompareError::Http {
                url: url.clone(),
                source,
            })?;

        let envelope: Envelope<RunInfo> = decode(response, &url).await?;
        Ok(envelope.data)
    }

    async fn poll(&self, run_id: &str) -> Result<RunStatus, CompareError> {
        let url = format!("{}/actor-runs/{}", self.base_url(), run_id);
        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|source| CompareError::Http {
                url: url.clone(),
                source,
            })?;

        let envelope: Envelope<RunState> = decode(response, &url).await?;
        Ok(envelope.data.status)
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<ActorItem>, CompareError> {
        let url = format!("{}/datasets/{}/items", self.base_url(), dataset_id);
        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|source| CompareError::Http {
                url: url.clone(),
                source,
            })?;

        decode(response, &url).await
    }
}

/// Checks the status and decodes a JSON body
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, CompareError> {
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(CompareError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| CompareError::Http {
        url: url.to_string(),
        source,
    })?;

    serde_json::from_slice(&body).map_err(|e| CompareError::Actor(format!("{} from {}", e, url)))
}
