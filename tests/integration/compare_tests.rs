//! Integration tests for the aggregator and the HTTP API
//!
//! Marketplaces are replaced with wiremock servers; the router is driven
//! in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use price_ripple::config::{Config, Secrets, SiteConfig};
use price_ripple::listing::{ExtractionStatus, SearchQuery};
use price_ripple::server::{build_router, AppState};
use price_ripple::{summarize, Aggregator};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EBAY_RESULTS: &str = r#"<html><body><ul>
  <li class="s-item"><div class="s-item__wrapper">
    <a class="s-item__link" href="/itm/1"><h3 class="s-item__title">iPhone 12 Blue</h3></a>
    <span class="s-item__price">$200.00</span>
  </div></li>
  <li class="s-item"><div class="s-item__wrapper">
    <a class="s-item__link" href="/itm/2"><h3 class="s-item__title">iPhone 12 Black</h3></a>
    <span class="s-item__price">$150.00</span>
  </div></li>
  <li class="s-item"><div class="s-item__wrapper">
    <a class="s-item__link" href="/itm/3"><h3 class="s-item__title">iPhone 12 Red</h3></a>
    <span class="s-item__price">$0</span>
  </div></li>
</ul></body></html>"#;

/// Serves eBay results and blocks everything else
async fn mock_marketplaces() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EBAY_RESULTS))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Points eBay and Mercari at the mock server
fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.search.platforms = vec!["ebay".to_string(), "mercari".to_string()];
    config.search.platform_timeout_secs = 10;

    for key in ["ebay", "mercari"] {
        config.platforms.insert(
            key.to_string(),
            SiteConfig {
                base_url: Some(base_url.to_string()),
                placeholder_price: None,
            },
        );
    }

    config
}

fn test_aggregator(config: &Config) -> Aggregator {
    Aggregator::from_config(config, &Secrets::default()).expect("Failed to build aggregator")
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_one_failing_platform_does_not_affect_others() {
    let mock_server = mock_marketplaces().await;
    let config = test_config(&mock_server.uri());
    let aggregator = test_aggregator(&config);

    let query = SearchQuery::new("iPhone 12", 3, 50).unwrap();
    let results = aggregator.aggregate(&query).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results["ebay"].status, ExtractionStatus::Ok);
    assert_eq!(results["ebay"].listings.len(), 2);
    assert!(matches!(results["mercari"].status, ExtractionStatus::Failed { .. }));
    assert!(results["mercari"].listings.is_empty());
}

#[tokio::test]
async fn test_end_to_end_statistics() {
    let mock_server = mock_marketplaces().await;
    let config = test_config(&mock_server.uri());
    let aggregator = test_aggregator(&config);

    let query = SearchQuery::new("iPhone 12", 3, 50).unwrap();
    let results = aggregator.aggregate(&query).await;
    let (listings, summary) = summarize(&results);

    let prices: Vec<f64> = listings.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![150.0, 200.0]);
    assert_eq!(summary.lowest_price, Some(150.0));
    assert_eq!(summary.highest_price, Some(200.0));
    assert_eq!(summary.average_price, Some(175.0));
    assert_eq!(summary.total_results, 2);
    assert_eq!(summary.degraded_platforms, vec!["mercari"]);
}

#[tokio::test]
async fn test_api_compare() {
    let mock_server = mock_marketplaces().await;
    let config = test_config(&mock_server.uri());
    let state = AppState::new(Arc::new(test_aggregator(&config)), &config.search);

    let (status, body) = get_json(
        build_router(state),
        "/compare?query=iPhone%2012&max_results=3",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "iPhone 12");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["price"], 150.0);
    assert_eq!(body["summary"]["average_price"], 175.0);
    assert_eq!(body["summary"]["total_results"], 2);
    assert_eq!(body["platforms"]["ebay"]["status"], "ok");
    assert_eq!(body["platforms"]["mercari"]["status"], "failed");
}

#[tokio::test]
async fn test_api_search_passthrough_skips_unpriced_items() {
    let mock_server = mock_marketplaces().await;
    let config = test_config(&mock_server.uri());
    let state = AppState::new(Arc::new(test_aggregator(&config)), &config.search);

    let (status, body) = get_json(build_router(state), "/search/ebay?query=iPhone+12").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "ebay");
    assert_eq!(body["status"], "ok");
    // The $0 item is dropped by the parser, so it never reaches the response
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["title"], "iPhone 12 Blue");
}

#[tokio::test]
async fn test_api_rejects_bad_requests() {
    let config = test_config("http://127.0.0.1:9");
    let state = AppState::new(Arc::new(test_aggregator(&config)), &config.search);
    let app = build_router(state);

    let (status, _) = get_json(app.clone(), "/compare?query=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app.clone(), "/compare").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app.clone(), "/compare?query=lamp&max_results=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app.clone(), "/compare?query=lamp&max_results=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(app, "/search/amazon?query=lamp").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("amazon"));
}

#[tokio::test]
async fn test_api_health_and_root() {
    let config = test_config("http://127.0.0.1:9");
    let state = AppState::new(Arc::new(test_aggregator(&config)), &config.search);
    let app = build_router(state);

    let (status, body) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["platforms"], serde_json::json!(["ebay", "mercari"]));

    let (status, body) = get_json(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}
