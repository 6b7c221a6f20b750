//! Proxy checker: probes endpoints concurrently through a transport

use crate::error::ProbeFailure;
use crate::proxy::geo::GeoLocator;
use crate::proxy::models::{Anonymity, Endpoint, ProbeOutcome};
use crate::proxy::transport::{HttpTransport, ProbeResponse, ProbeTransport};
use futures::stream::{self, StreamExt};
use reqwest::header::HeaderMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default timeout for proxy checks in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent checks
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Header whose presence in the target's response means the caller leaked through
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Path to MMDB file for geolocation (optional)
    pub mmdb_path: Option<PathBuf>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            mmdb_path: None,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_mmdb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mmdb_path = Some(path.into());
        self
    }
}

/// Classify anonymity from the target's response headers
pub fn classify_anonymity(headers: &HeaderMap) -> Anonymity {
    if headers.contains_key(FORWARDED_FOR) {
        Anonymity::Anonymous
    } else {
        Anonymity::HighAnonymity
    }
}

/// Proxy checker for validating proxies
pub struct ProxyChecker<T = HttpTransport> {
    config: CheckerConfig,
    transport: Arc<T>,
    geo_locator: Option<GeoLocator>,
}

impl ProxyChecker<HttpTransport> {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: ProbeTransport> ProxyChecker<T> {
    /// Create a checker over a custom transport
    pub fn with_transport(config: CheckerConfig, transport: T) -> Self {
        let geo_locator = config.mmdb_path.as_ref().and_then(|path| {
            GeoLocator::from_path(path)
                .map_err(|e| warn!("Geolocation disabled: {}", e))
                .ok()
        });

        Self {
            config,
            transport: Arc::new(transport),
            geo_locator,
        }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Probe a single endpoint once
    pub async fn probe(
        &self,
        endpoint: &Endpoint,
        target: &str,
    ) -> Result<ProbeOutcome, ProbeFailure> {
        let response: ProbeResponse = tokio::time::timeout(
            self.config.timeout,
            self.transport.fetch(endpoint, target, self.config.timeout),
        )
        .await
        .map_err(|_| ProbeFailure::Timeout)??;

        if response.status != 200 {
            return Err(ProbeFailure::Status(response.status));
        }

        let mut outcome = ProbeOutcome::new(
            endpoint.clone(),
            response.elapsed,
            classify_anonymity(&response.headers),
        );

        if outcome.country.is_none() {
            outcome.country = self.lookup_country(endpoint);
        }

        Ok(outcome)
    }

    /// Probe every endpoint once and keep the successes
    ///
    /// Returns only after every probe has settled.
    pub async fn probe_all(&self, endpoints: Vec<Endpoint>, target: &str) -> Vec<ProbeOutcome> {
        let total = endpoints.len();
        let concurrency = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));

        info!(
            "Probing {} proxies via {} ({} concurrent, timeout {:?})",
            total, target, concurrency, self.config.timeout
        );

        let outcomes: Vec<ProbeOutcome> = stream::iter(endpoints)
            .map(|endpoint| {
                let sem = Arc::clone(&semaphore);
                async move {
                    // The semaphore lives until the stream is drained and is never closed
                    let _permit = sem.acquire().await.ok()?;
                    match self.probe(&endpoint, target).await {
                        Ok(outcome) => {
                            debug!("{} ok in {:.2}s", endpoint, outcome.elapsed.as_secs_f64());
                            Some(outcome)
                        }
                        Err(reason) => {
                            debug!("{} failed: {}", endpoint, reason);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(concurrency)
            .filter_map(|outcome| async move { outcome })
            .collect()
            .await;

        info!("{} of {} proxies working", outcomes.len(), total);
        outcomes
    }

    fn lookup_country(&self, endpoint: &Endpoint) -> Option<String> {
        let geo = self.geo_locator.as_ref()?;
        match geo.country_code(endpoint.host) {
            Ok(code) => code,
            Err(e) => {
                debug!("No country for {}: {}", endpoint.host, e);
                None
            }
        }
    }
}

impl Default for ProxyChecker<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}
