//! yt-dlp proxy - run yt-dlp through the best free HTTP proxy
//!
//! Candidates are collected from public proxy lists, each one is timed on a
//! reference download, and the fastest few are kept in a JSON file. yt-dlp is
//! then run through a random proxy from that file, switching to another one
//! whenever the target answers with a sign-in challenge or a 403.

pub mod error;
pub mod proxy;
pub mod ytdlp;

pub use error::ProxyError;
pub use proxy::*;
pub use ytdlp::*;

use std::path::PathBuf;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ranked proxy list location
    pub proxy_file: PathBuf,
    /// yt-dlp executable; looked up on PATH when unset
    pub ytdlp_path: Option<PathBuf>,
    /// Attempt ceiling for one run; defaults to list size times two
    pub max_attempts: Option<usize>,
    /// Number of proxies probed at once during an update
    pub concurrency: usize,
    /// Upper bound on candidates probed per update; unbounded when unset
    pub max_candidates: Option<usize>,
    /// MaxMind country database used to fill in unknown countries
    pub mmdb_path: Option<PathBuf>,
    /// Countries whose proxies are never used
    pub denied_countries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_file: PathBuf::from(DEFAULT_PROXY_FILE),
            ytdlp_path: None,
            max_attempts: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_candidates: None,
            mmdb_path: None,
            denied_countries: CandidateFilter::default().denied_countries,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxy_file(mut self, path: PathBuf) -> Self {
        self.proxy_file = path;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<usize>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_mmdb_path(mut self, path: Option<PathBuf>) -> Self {
        self.mmdb_path = path;
        self
    }

    pub fn store(&self) -> ProxyStore {
        ProxyStore::new(&self.proxy_file)
    }

    /// Ranker over the built-in provider list
    pub fn ranker(&self) -> Result<ProxyRanker> {
        let crawler = ProxyCrawler::new()?;
        let providers = crawler.providers(ProxyCrawler::default_sources());
        let filter = CandidateFilter::new().with_denied_countries(self.denied_countries.clone());

        let mut ranker = ProxyRanker::new(providers, ProxyChecker::new())
            .with_filter(filter)
            .with_concurrency(self.concurrency)
            .with_max_candidates(self.max_candidates);

        if let Some(path) = &self.mmdb_path {
            match GeoLocator::from_path(path) {
                Ok(geo) => ranker = ranker.with_geo_locator(geo),
                Err(e) => tracing::warn!("Ignoring country database {:?}: {}", path, e),
            }
        }

        Ok(ranker)
    }

    pub fn runner(&self) -> CommandRunner {
        let config = match &self.ytdlp_path {
            Some(path) => RunnerConfig::new().with_executable(path.clone()),
            None => RunnerConfig::new(),
        };
        CommandRunner::with_config(config)
    }

    pub fn orchestrator(&self) -> Result<Orchestrator> {
        let orchestrator = Orchestrator::new(self.store(), self.ranker()?, self.runner());
        Ok(match self.max_attempts {
            Some(max_attempts) => orchestrator.with_max_attempts(max_attempts),
            None => orchestrator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.proxy_file, PathBuf::from("proxy.json"));
        assert_eq!(config.concurrency, 16);
        assert!(config.denied_countries.iter().any(|c| c == "RU"));
        assert!(config.max_attempts.is_none());
        assert!(config.max_candidates.is_none());
    }

    #[test]
    fn test_config_builds_components() {
        let config = Config::new()
            .with_proxy_file(PathBuf::from("/tmp/elsewhere/list.json"))
            .with_ytdlp_path(Some(PathBuf::from("/nonexistent/yt-dlp")))
            .with_mmdb_path(Some(PathBuf::from("/nonexistent/country.mmdb")))
            .with_max_attempts(Some(3))
            .with_max_candidates(Some(200));

        assert_eq!(config.store().path(), PathBuf::from("/tmp/elsewhere/list.json"));
        assert!(config.runner().locate().is_none());
        assert!(config.orchestrator().is_ok());
    }
}
