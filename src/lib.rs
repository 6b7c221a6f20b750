//! Proxy Probe - Bulk Proxy Validator
//!
//! Loads candidate proxies from per-protocol lists, probes each one through
//! its protocol with bounded concurrency, classifies anonymity and writes
//! grouped Markdown reports.

pub mod error;
pub mod proxy;
pub mod runner;

pub use error::{Error, ProbeFailure};
pub use proxy::*;
pub use runner::{run, RunReport};

use std::path::PathBuf;

/// Library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Default directory reports are written to
pub const DEFAULT_OUTPUT_DIR: &str = "proxy_reports";

/// Configuration for a single run, built once at startup
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding connect.txt, http.txt, https.txt, socks4.txt, socks5.txt
    pub input_dir: PathBuf,
    /// Directory the reports are written to
    pub output_dir: PathBuf,
    pub checker: CheckerConfig,
    pub target: TargetPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            checker: CheckerConfig::default(),
            target: TargetPolicy::default(),
        }
    }
}
