use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the proxy store, cycler, and command runner
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Cannot read proxy list {path:?}: {source}")]
    ProxyListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Proxy list {path:?} is malformed: {source}")]
    ProxyListMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write proxy list {path:?}: {source}")]
    ProxyListWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No proxies available in {0:?}; run with --update to refresh the list")]
    NoProxiesAvailable(PathBuf),

    #[error("{program} not found in PATH. Please specify the path to {program} with --ytdlp-path")]
    ExecutableUnavailable { program: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
