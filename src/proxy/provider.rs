use crate::proxy::models::Candidate;
use async_trait::async_trait;

/// An upstream source of free proxies
///
/// Each provider fails on its own; the ranker logs the error and carries on
/// with the others.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_candidates(&self) -> anyhow::Result<Vec<Candidate>>;
}
