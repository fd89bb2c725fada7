//! Proxy crawler module for fetching candidates from public proxy lists
//!
//! Every source is exposed as a [`Provider`]; the default set is declared
//! statically in [`ProxyCrawler::default_sources`].

use crate::proxy::models::Candidate;
use crate::proxy::parser::ProxyParser;
use crate::proxy::provider::Provider;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for proxy crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for HTTP requests
    pub timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Proxy source representing a website that publishes a proxy list
#[derive(Debug, Clone)]
pub struct ProxySource {
    /// Name of the proxy source
    pub name: String,
    /// URL to fetch proxies from
    pub url: String,
}

impl ProxySource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// A provider backed by one list URL
pub struct ListProvider {
    source: ProxySource,
    client: Client,
}

impl ListProvider {
    pub fn new(source: ProxySource, client: Client) -> Self {
        Self { source, client }
    }
}

#[async_trait]
impl Provider for ListProvider {
    fn name(&self) -> &str {
        &self.source.name
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .get(&self.source.url)
            .send()
            .await?
            .error_for_status()?;
        let content = response.text().await?;
        Ok(ProxyParser::parse_document(&content))
    }
}

/// Builds providers that share one HTTP client
pub struct ProxyCrawler {
    client: Client,
}

impl ProxyCrawler {
    /// Create a new proxy crawler with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlerConfig::default())
    }

    /// Create a new proxy crawler with custom configuration
    pub fn with_config(config: CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap each source in a provider
    pub fn providers(&self, sources: Vec<ProxySource>) -> Vec<Box<dyn Provider>> {
        sources
            .into_iter()
            .map(|source| Box::new(ListProvider::new(source, self.client.clone())) as Box<dyn Provider>)
            .collect()
    }

    /// Get the built-in list of free HTTP proxy sources
    ///
    /// proxyscrape and TheSpeedX publish several thousand entries each, so
    /// a full survey at the default concurrency can take a long while;
    /// [`ProxyRanker::with_max_candidates`](crate::proxy::ranker::ProxyRanker::with_max_candidates)
    /// bounds it.
    pub fn default_sources() -> Vec<ProxySource> {
        vec![
            ProxySource::new(
                "proxyscrape",
                "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all&ssl=all&anonymity=all",
            ),
            ProxySource::new(
                "free-proxy-list.net",
                "https://free-proxy-list.net/",
            ),
            ProxySource::new("us-proxy.org", "https://www.us-proxy.org/"),
            ProxySource::new(
                "thespeedx",
                "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
            ),
        ]
    }
}
