//! API route handlers

use crate::listing::{ExtractionStatus, ListingRecord, Location, PlatformResultSet, SearchQuery};
use crate::output::{summarize, ComparisonSummary};
use crate::server::error::ApiError;
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Query string shared by `/compare` and `/search/{platform}`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub max_results: Option<usize>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl SearchParams {
    fn to_query(&self, state: &AppState) -> Result<SearchQuery, ApiError> {
        let max_results = self.max_results.unwrap_or(state.default_max_results);
        let location = self
            .city
            .as_ref()
            .map(|city| Location::new(city.clone(), self.state.clone()));

        Ok(SearchQuery::new(&self.query, max_results, state.max_results_limit)?
            .with_location(location))
    }
}

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    platforms: Vec<String>,
}

#[derive(Serialize)]
pub struct CompareResponse {
    query: String,
    results: Vec<ListingRecord>,
    summary: ComparisonSummary,
    platforms: PlatformResultSet,
}

#[derive(Serialize)]
pub struct SearchResponse {
    platform: String,
    #[serde(flatten)]
    status: ExtractionStatus,
    results: Vec<ListingRecord>,
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Price Ripple is running. Try /compare?query=iphone+12",
    })
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        platforms: state.aggregator.platforms(),
    })
}

/// Searches every platform and returns merged, sorted listings with statistics
pub async fn compare_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CompareResponse>, ApiError> {
    let query = params.to_query(&state)?;
    let platforms = state.aggregator.aggregate(&query).await;
    let (results, summary) = summarize(&platforms);

    Ok(Json(CompareResponse {
        query: query.text,
        results,
        summary,
        platforms,
    }))
}

/// Raw results from one platform, without filtering or statistics
pub async fn search_handler(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.to_query(&state)?;
    let extraction = state.aggregator.search_one(&platform, &query).await?;

    Ok(Json(SearchResponse {
        platform: platform.to_ascii_lowercase(),
        status: extraction.status,
        results: extraction.listings,
    }))
}
