//! Collects candidates from every provider, probes them, and keeps the best

use crate::error::ProxyError;
use crate::proxy::checker::ProxyChecker;
use crate::proxy::filter::CandidateFilter;
use crate::proxy::geo::GeoLocator;
use crate::proxy::models::{Candidate, ScoredProxy};
use crate::proxy::parser::dedup_candidates;
use crate::proxy::provider::Provider;
use crate::proxy::store::ProxyStore;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default number of proxies probed at once
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Size of the persisted list
pub const TOP_K: usize = 5;

/// Proxy ranker: fetch, filter, validate, sort, persist
pub struct ProxyRanker {
    providers: Vec<Box<dyn Provider>>,
    checker: ProxyChecker,
    filter: CandidateFilter,
    geo_locator: Option<GeoLocator>,
    concurrency: usize,
    max_candidates: Option<usize>,
}

impl ProxyRanker {
    pub fn new(providers: Vec<Box<dyn Provider>>, checker: ProxyChecker) -> Self {
        Self {
            providers,
            checker,
            filter: CandidateFilter::default(),
            geo_locator: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_candidates: None,
        }
    }

    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_geo_locator(mut self, geo_locator: GeoLocator) -> Self {
        self.geo_locator = Some(geo_locator);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Probe at most `max` eligible candidates, in discovery order
    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }

    /// Gather candidates from all providers in declaration order
    ///
    /// A failing provider contributes nothing.
    pub async fn collect_candidates(&self) -> Vec<Candidate> {
        let fetches = self.providers.iter().map(|provider| async move {
            info!("Fetching proxies from {}", provider.name());
            match provider.fetch_candidates().await {
                Ok(candidates) => {
                    info!("Found {} proxies from {}", candidates.len(), provider.name());
                    candidates
                }
                Err(e) => {
                    warn!("Failed to fetch proxies from {}: {:#}", provider.name(), e);
                    Vec::new()
                }
            }
        });

        let mut candidates: Vec<Candidate> = stream::iter(fetches)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        if let Some(ref geo) = self.geo_locator {
            geo.enrich(&mut candidates);
        }

        dedup_candidates(candidates)
    }

    /// Probe every eligible candidate and return the fastest survivors
    pub async fn rank(&self) -> Vec<ScoredProxy> {
        let mut records = self.filter.apply(self.collect_candidates().await);
        if let Some(max) = self.max_candidates {
            if records.len() > max {
                info!("Keeping the first {} of {} candidates", max, records.len());
                records.truncate(max);
            }
        }
        info!("Testing {} proxies", records.len());

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut survivors: Vec<(usize, ScoredProxy)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| {
                let sem = Arc::clone(&semaphore);
                let checker = self.checker.clone();
                async move {
                    let _permit = sem.acquire_owned().await.ok()?;
                    let label = record.connection_string();
                    let result = checker.check_proxy(record).await;
                    debug!(proxy = %label, status = ?result.status, "proxy checked");
                    result.into_scored().map(|scored| (index, scored))
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|survivor| async move { survivor })
            .collect()
            .await;

        info!("{} proxies passed validation", survivors.len());
        Self::select_best(&mut survivors)
    }

    /// Stable ascending sort by measured time, truncated to [`TOP_K`]
    fn select_best(survivors: &mut [(usize, ScoredProxy)]) -> Vec<ScoredProxy> {
        survivors.sort_by(|(ia, a), (ib, b)| a.time.total_cmp(&b.time).then(ia.cmp(ib)));
        survivors
            .iter()
            .take(TOP_K)
            .map(|(_, scored)| scored.clone())
            .collect()
    }

    /// Rank and replace the persisted list, even when nothing survived
    pub async fn update(&self, store: &ProxyStore) -> Result<Vec<ScoredProxy>, ProxyError> {
        let best = self.rank().await;
        store.save(&best)?;
        info!("Saved {} proxies to {:?}", best.len(), store.path());
        Ok(best)
    }
}
