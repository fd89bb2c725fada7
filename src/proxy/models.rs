//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy authentication credentials
///
/// Username and password only ever travel together, so a record either has
/// both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl ProxyAuth {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// A raw proxy entry as reported by a provider, not yet validated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidate {
    pub host: Option<String>,
    pub port: u16,
    pub auth: Option<ProxyAuth>,
    pub country: Option<String>,
}

impl Candidate {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port,
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, username: String, password: String) -> Self {
        self.auth = Some(ProxyAuth::new(username, password));
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Convert into a record, dropping candidates without a host
    pub fn into_record(self) -> Option<ProxyRecord> {
        Some(ProxyRecord {
            host: self.host?,
            port: self.port,
            auth: self.auth,
            country: self.country,
        })
    }
}

/// A proxy with a known host, ready to be probed or used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    pub host: String,
    pub port: u16,
    #[serde(flatten)]
    pub auth: Option<ProxyAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ProxyRecord {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            auth: None,
            country: None,
        }
    }

    pub fn with_auth(host: String, port: u16, username: String, password: String) -> Self {
        Self {
            host,
            port,
            auth: Some(ProxyAuth::new(username, password)),
            country: None,
        }
    }

    /// Get the connection string: `user:pass@host:port` or `host:port`
    pub fn connection_string(&self) -> String {
        match &self.auth {
            Some(auth) => format!(
                "{}:{}@{}:{}",
                auth.username, auth.password, self.host, self.port
            ),
            None => format!("{}:{}", self.host, self.port),
        }
    }

    /// Get the proxy URL handed to HTTP clients and yt-dlp
    pub fn url(&self) -> String {
        format!("http://{}", self.connection_string())
    }
}

impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.connection_string())
    }
}

/// A survivor of validation together with its measured transfer time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProxy {
    #[serde(flatten)]
    pub record: ProxyRecord,
    /// Seconds spent on the sampled download; `+inf` marks a proxy that
    /// answered correctly but was too slow to be useful
    #[serde(with = "measured_time")]
    pub time: f64,
}

impl ScoredProxy {
    pub fn new(record: ProxyRecord, time: f64) -> Self {
        Self { record, time }
    }

    pub fn is_too_slow(&self) -> bool {
        self.time.is_infinite()
    }
}

/// JSON has no infinity, so it is written as the string `"inf"`.
mod measured_time {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(time: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if time.is_finite() {
            serializer.serialize_f64(*time)
        } else {
            serializer.serialize_str("inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(TimeVisitor)
    }

    struct TimeVisitor;

    impl<'de> Visitor<'de> for TimeVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number of seconds, null, or \"inf\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(f64::INFINITY)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v.to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
                other => other
                    .parse::<f64>()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }
}

/// Result of proxy check operation
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyCheckStatus {
    /// Sample downloaded; elapsed seconds
    Working(f64),
    /// Throughput fell under the floor before the sample completed
    TooSlow,
    /// Response looked wrong (status, size) or the transfer broke
    Failed(String),
    Timeout,
}

/// Detailed result of a proxy check
#[derive(Debug, Clone)]
pub struct ProxyCheckResult {
    pub proxy: ProxyRecord,
    pub status: ProxyCheckStatus,
}

impl ProxyCheckResult {
    pub fn working(proxy: ProxyRecord, elapsed_secs: f64) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Working(elapsed_secs),
        }
    }

    pub fn too_slow(proxy: ProxyRecord) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::TooSlow,
        }
    }

    pub fn failed(proxy: ProxyRecord, error: String) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Failed(error),
        }
    }

    pub fn timeout(proxy: ProxyRecord) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Timeout,
        }
    }

    /// Slow proxies still count: they are ranked last rather than dropped
    pub fn is_usable(&self) -> bool {
        matches!(
            self.status,
            ProxyCheckStatus::Working(_) | ProxyCheckStatus::TooSlow
        )
    }

    pub fn into_scored(self) -> Option<ScoredProxy> {
        if !self.is_usable() {
            return None;
        }
        let time = match self.status {
            ProxyCheckStatus::Working(secs) => secs,
            _ => f64::INFINITY,
        };
        Some(ScoredProxy::new(self.proxy, time))
    }
}
