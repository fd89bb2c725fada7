//! Drives yt-dlp through successive proxies until one is accepted

use crate::error::ProxyError;
use crate::proxy::cycler::ProxyCycler;
use crate::proxy::models::ScoredProxy;
use crate::proxy::ranker::ProxyRanker;
use crate::proxy::store::ProxyStore;
use crate::ytdlp::runner::{CommandRunner, RunVerdict};
use std::collections::HashSet;
use tracing::{info, warn};

/// Default attempt ceiling is the number of distinct proxies times this
pub const ATTEMPT_MULTIPLIER: usize = 2;

/// How an [`Orchestrator::execute`] call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Success { attempts: usize },
    /// Every proxy was refused, or the attempt ceiling was reached
    ExhaustedRetries { attempts: usize },
    /// yt-dlp is not installed or not where it was configured
    Unavailable,
}

pub struct Orchestrator {
    store: ProxyStore,
    ranker: ProxyRanker,
    runner: CommandRunner,
    max_attempts: Option<usize>,
}

impl Orchestrator {
    pub fn new(store: ProxyStore, ranker: ProxyRanker, runner: CommandRunner) -> Self {
        Self {
            store,
            ranker,
            runner,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn store(&self) -> &ProxyStore {
        &self.store
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Refresh the persisted list
    pub async fn update(&self) -> Result<Vec<ScoredProxy>, ProxyError> {
        self.ranker.update(&self.store).await
    }

    /// Run yt-dlp with `args`, switching proxies whenever one is refused
    pub async fn execute(&self, args: &[String]) -> Result<ExecuteOutcome, ProxyError> {
        if self.runner.locate().is_none() {
            return Ok(ExecuteOutcome::Unavailable);
        }

        info!("Checking for proxy list...");
        if !self.store.exists() {
            info!(
                "{:?} not found. Starting proxy list update...",
                self.store.path()
            );
            self.update().await?;
        }

        let cycler = ProxyCycler::load(&self.store)?;
        let distinct = cycler.distinct();
        let max_attempts = self
            .max_attempts
            .unwrap_or(distinct * ATTEMPT_MULTIPLIER);

        let mut rejected: HashSet<String> = HashSet::new();
        let mut attempts = 0;

        for connection in cycler.stream() {
            if attempts >= max_attempts || rejected.len() >= distinct {
                break;
            }
            if rejected.contains(&connection) {
                continue;
            }

            attempts += 1;
            info!("Using proxy from {}", connection);
            match self.runner.run(&connection, args).await? {
                RunVerdict::Success => return Ok(ExecuteOutcome::Success { attempts }),
                RunVerdict::Unavailable => return Ok(ExecuteOutcome::Unavailable),
                RunVerdict::Rejected => {
                    warn!("Got 'Sign in to confirm' error. Trying again with another proxy...");
                    rejected.insert(connection);
                }
            }
        }

        Ok(ExecuteOutcome::ExhaustedRetries { attempts })
    }

    /// Run yt-dlp once through a caller-chosen proxy
    pub async fn execute_raw(
        &self,
        connection: &str,
        args: &[String],
    ) -> Result<RunVerdict, ProxyError> {
        self.runner.run(connection, args).await
    }
}
