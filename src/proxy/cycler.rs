//! Endless random draws over the persisted proxy list

use crate::error::ProxyError;
use crate::proxy::store::ProxyStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Connection strings loaded from one read of the proxy list
#[derive(Debug, Clone)]
pub struct ProxyCycler {
    connections: Vec<String>,
}

impl ProxyCycler {
    /// Read the store; a missing, malformed, or empty list is an error
    pub fn load(store: &ProxyStore) -> Result<Self, ProxyError> {
        let proxies = store.load()?;
        let connections: Vec<String> = proxies
            .iter()
            .map(|p| p.record.connection_string())
            .collect();
        Self::from_connections(connections)
            .ok_or_else(|| ProxyError::NoProxiesAvailable(store.path().to_path_buf()))
    }

    pub fn from_connections(connections: Vec<String>) -> Option<Self> {
        (!connections.is_empty()).then_some(Self { connections })
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of different connection strings in the list
    pub fn distinct(&self) -> usize {
        self.connections.iter().collect::<HashSet<_>>().len()
    }

    /// A fresh, never-ending sequence of uniform draws with replacement
    pub fn stream(&self) -> ProxyStream<'_> {
        ProxyStream {
            connections: &self.connections,
            rng: StdRng::from_entropy(),
        }
    }
}

pub struct ProxyStream<'a> {
    connections: &'a [String],
    rng: StdRng,
}

impl Iterator for ProxyStream<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.connections.choose(&mut self.rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::{ProxyRecord, ScoredProxy};

    fn store_with(proxies: &[ScoredProxy]) -> (tempfile::TempDir, ProxyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProxyStore::new(dir.path().join("proxy.json"));
        store.save(proxies).unwrap();
        (dir, store)
    }

    #[test]
    fn test_single_entry_always_drawn() {
        let (_dir, store) = store_with(&[ScoredProxy::new(
            ProxyRecord::new("1.2.3.4".to_string(), 8080),
            0.5,
        )]);
        let cycler = ProxyCycler::load(&store).unwrap();
        assert!(cycler.stream().take(50).all(|c| c == "1.2.3.4:8080"));
    }

    #[test]
    fn test_draws_stay_within_list() {
        let (_dir, store) = store_with(&[
            ScoredProxy::new(ProxyRecord::new("1.1.1.1".to_string(), 1), 0.1),
            ScoredProxy::new(
                ProxyRecord::with_auth("2.2.2.2".to_string(), 2, "u".into(), "p".into()),
                0.2,
            ),
        ]);
        let cycler = ProxyCycler::load(&store).unwrap();
        assert_eq!(cycler.len(), 2);
        assert_eq!(cycler.distinct(), 2);

        let drawn: HashSet<String> = cycler.stream().take(200).collect();
        assert!(drawn.is_subset(&HashSet::from([
            "1.1.1.1:1".to_string(),
            "u:p@2.2.2.2:2".to_string(),
        ])));
    }

    #[test]
    fn test_empty_list_fails_fast() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(
            ProxyCycler::load(&store),
            Err(ProxyError::NoProxiesAvailable(_))
        ));
    }

    #[test]
    fn test_missing_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProxyStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            ProxyCycler::load(&store),
            Err(ProxyError::ProxyListUnreadable { .. })
        ));
    }

    #[test]
    fn test_distinct_ignores_duplicates() {
        let cycler = ProxyCycler::from_connections(vec![
            "1.1.1.1:1".to_string(),
            "1.1.1.1:1".to_string(),
        ])
        .unwrap();
        assert_eq!(cycler.len(), 2);
        assert_eq!(cycler.distinct(), 1);
        assert!(ProxyCycler::from_connections(Vec::new()).is_none());
    }
}
