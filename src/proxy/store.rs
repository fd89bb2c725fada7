//! JSON file holding the ranked proxy list between runs

use crate::error::ProxyError;
use crate::proxy::models::ScoredProxy;
use std::path::{Path, PathBuf};

/// Default location, relative to the working directory
pub const DEFAULT_PROXY_FILE: &str = "proxy.json";

/// The persisted ranked list
#[derive(Debug, Clone)]
pub struct ProxyStore {
    path: PathBuf,
}

impl Default for ProxyStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_FILE)
    }
}

impl ProxyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<Vec<ScoredProxy>, ProxyError> {
        let data = std::fs::read_to_string(&self.path).map_err(|source| {
            ProxyError::ProxyListUnreadable {
                path: self.path.clone(),
                source,
            }
        })?;

        serde_json::from_str(&data).map_err(|source| ProxyError::ProxyListMalformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the whole list
    ///
    /// Written to a sibling temp file and renamed over the old list, so an
    /// interrupted update leaves the previous list intact.
    pub fn save(&self, proxies: &[ScoredProxy]) -> Result<(), ProxyError> {
        let data = serde_json::to_string_pretty(proxies).map_err(|source| {
            ProxyError::ProxyListMalformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let write_err = |source| ProxyError::ProxyListWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        Ok(())
    }
}
