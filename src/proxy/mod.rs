//! Proxy module for finding and ranking free HTTP proxies
//!
//! This module provides functionality for:
//! - Fetching candidate proxies from public list providers
//! - Filtering candidates by host and country
//! - Measuring each candidate's throughput on a reference download
//! - Persisting the fastest few and drawing from them at random

pub mod checker;
pub mod crawler;
pub mod cycler;
pub mod filter;
pub mod geo;
pub mod models;
pub mod parser;
pub mod provider;
pub mod ranker;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use checker::{CheckerConfig, ProxyChecker};
pub use crawler::{CrawlerConfig, ListProvider, ProxyCrawler, ProxySource};
pub use cycler::ProxyCycler;
pub use filter::CandidateFilter;
pub use geo::GeoLocator;
pub use models::{Candidate, ProxyAuth, ProxyCheckResult, ProxyCheckStatus, ProxyRecord, ScoredProxy};
pub use parser::ProxyParser;
pub use provider::Provider;
pub use ranker::{ProxyRanker, DEFAULT_CONCURRENCY, TOP_K};
pub use store::{ProxyStore, DEFAULT_PROXY_FILE};
