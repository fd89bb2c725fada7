use crate::proxy::models::{Candidate, ProxyRecord};

/// Countries whose proxies are never probed
pub const DEFAULT_DENIED_COUNTRIES: &[&str] = &["Russia", "RU"];

/// The validity predicate applied once to the merged candidate pool
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    pub denied_countries: Vec<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            denied_countries: DEFAULT_DENIED_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CandidateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_denied_countries(mut self, countries: Vec<String>) -> Self {
        self.denied_countries = countries;
        self
    }

    pub fn is_denied_country(&self, country: &str) -> bool {
        self.denied_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }

    pub fn accepts(&self, candidate: &Candidate) -> bool {
        if candidate.host.is_none() {
            return false;
        }

        match &candidate.country {
            Some(country) => !self.is_denied_country(country),
            None => true,
        }
    }

    /// Keep accepted candidates as records, preserving order
    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<ProxyRecord> {
        candidates
            .into_iter()
            .filter(|c| self.accepts(c))
            .filter_map(Candidate::into_record)
            .collect()
    }
}
