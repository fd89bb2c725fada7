//! Proxy checker module: measures how fast a proxy relays a reference file

use crate::proxy::models::{ProxyCheckResult, ProxyRecord, ScoredProxy};
use crate::Result;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Default timeout for connect, headers, and each body read, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Reference payload fetched through every candidate
const DEFAULT_TEST_URL: &str = "http://212.183.159.230/5MB.zip";

/// Exact size of the reference payload, 5 MiB
const DEFAULT_EXPECTED_SIZE: u64 = 5 * 1024 * 1024;

/// From this share of the payload onward, slow proxies are given up on
const DEFAULT_SLOW_CHECK_FRACTION: f64 = 0.15;

/// Share of the payload after which the measurement is final
const DEFAULT_SAMPLE_FRACTION: f64 = 0.2;

/// Throughput floor in bytes per second
const DEFAULT_MIN_THROUGHPUT: f64 = 100_000.0;

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for connecting, receiving headers, and each body read
    pub timeout: Duration,
    /// URL of the reference payload
    pub test_url: String,
    /// Declared size the response must carry
    pub expected_size: u64,
    pub slow_check_fraction: f64,
    pub sample_fraction: f64,
    /// Bytes per second under which a proxy is scored as too slow
    pub min_throughput: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_url: DEFAULT_TEST_URL.to_string(),
            expected_size: DEFAULT_EXPECTED_SIZE,
            slow_check_fraction: DEFAULT_SLOW_CHECK_FRACTION,
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            min_throughput: DEFAULT_MIN_THROUGHPUT,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }

    pub fn with_expected_size(mut self, size: u64) -> Self {
        self.expected_size = size;
        self
    }

    pub fn with_fractions(mut self, slow_check: f64, sample: f64) -> Self {
        self.slow_check_fraction = slow_check;
        self.sample_fraction = sample;
        self
    }

    pub fn with_min_throughput(mut self, bytes_per_sec: f64) -> Self {
        self.min_throughput = bytes_per_sec;
        self
    }
}

/// Proxy checker for validating proxies
#[derive(Debug, Clone, Default)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Score a proxy, or `None` when it cannot relay the reference payload
    pub async fn validate(&self, proxy: ProxyRecord) -> Option<ScoredProxy> {
        self.check_proxy(proxy).await.into_scored()
    }

    /// Check a single proxy
    pub async fn check_proxy(&self, proxy: ProxyRecord) -> ProxyCheckResult {
        let client = match self.create_client(&proxy) {
            Ok(client) => client,
            Err(e) => return ProxyCheckResult::failed(proxy, e.to_string()),
        };

        let start = Instant::now();
        let mut response =
            match timeout(self.config.timeout, client.get(&self.config.test_url).send()).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return ProxyCheckResult::failed(proxy, e.to_string()),
                Err(_) => return ProxyCheckResult::timeout(proxy),
            };

        if !response.status().is_success() {
            let status = response.status();
            return ProxyCheckResult::failed(proxy, format!("HTTP status: {}", status));
        }

        // Captive portals and transparent caches answer with their own page
        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared != Some(self.config.expected_size) {
            return ProxyCheckResult::failed(
                proxy,
                format!("unexpected content length: {:?}", declared),
            );
        }

        let slow_check_at = self.threshold(self.config.slow_check_fraction);
        let sample_at = self.threshold(self.config.sample_fraction);
        let mut downloaded: u64 = 0;

        loop {
            let chunk = match timeout(self.config.timeout, response.chunk()).await {
                Ok(Ok(Some(chunk))) => chunk,
                Ok(Ok(None)) => break,
                Ok(Err(e)) => return ProxyCheckResult::failed(proxy, e.to_string()),
                Err(_) => return ProxyCheckResult::timeout(proxy),
            };
            downloaded += chunk.len() as u64;

            if downloaded >= slow_check_at {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 && (downloaded as f64 / elapsed) < self.config.min_throughput {
                    return ProxyCheckResult::too_slow(proxy);
                }
            }

            if downloaded >= sample_at {
                break;
            }
        }

        ProxyCheckResult::working(proxy, round_secs(start.elapsed()))
    }

    fn threshold(&self, fraction: f64) -> u64 {
        (self.config.expected_size as f64 * fraction).ceil() as u64
    }

    /// Create a reqwest client that routes through the proxy
    fn create_client(&self, proxy: &ProxyRecord) -> Result<Client> {
        let client = Client::builder()
            .proxy(ReqwestProxy::http(proxy.url())?)
            .connect_timeout(self.config.timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(client)
    }
}

fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
