//! Fetch module for marketplace pages and scraping services
//!
//! This module contains every outbound request the extractors make:
//! - Direct page fetches with a browser-like client
//! - Fetches through a render-capable proxy
//! - Asynchronous actor jobs with status polling

mod actor;
mod client;
mod proxy;

pub use actor::{ActorClient, ActorItem, ActorOutcome, ActorSearch, RunStatus};
pub use client::{build_http_client, fetch_page, FetchResult};
pub use proxy::RenderProxy;
