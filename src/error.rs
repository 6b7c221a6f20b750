//! Error types for a probe run

use std::io;
use thiserror::Error;

/// Errors that stop a run
#[derive(Error, Debug)]
pub enum Error {
    #[error("no proxies loaded; ensure the proxy source files are populated")]
    NoEndpoints,

    #[error("no working proxies found; no report generated")]
    NoWorkingProxies,

    #[error("could not determine the local address: {0}")]
    LocalAddress(#[source] io::Error),

    #[error("invalid probe target: {0}")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("geolocation error: {0}")]
    Geo(String),
}

/// Why a single probe produced no outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("timed out")]
    Timeout,

    #[error("HTTP status: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(String),
}

impl From<Error> for ProbeFailure {
    fn from(err: Error) -> Self {
        match err {
            Error::Client(e) if e.is_timeout() => ProbeFailure::Timeout,
            Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => ProbeFailure::Timeout,
            other => ProbeFailure::Transport(other.to_string()),
        }
    }
}
