//! Proxy module for loading, probing and reporting on proxies
//!
//! This module provides functionality for:
//! - Loading per-protocol proxy lists (IP:PORT, IP:PORT:COUNTRY)
//! - Resolving the destination every probe is sent to
//! - Probing proxies with bounded concurrency
//! - Grouping working proxies and writing Markdown reports

pub mod checker;
pub mod geo;
pub mod models;
pub mod parser;
pub mod report;
pub mod target;
pub mod transport;
pub mod writer;

pub use checker::{classify_anonymity, CheckerConfig, ProxyChecker};
pub use geo::GeoLocator;
pub use models::{Anonymity, Endpoint, ProbeOutcome, ProxyType};
pub use parser::ProxyParser;
pub use report::{GroupedReport, ProtocolGroup};
pub use target::TargetPolicy;
pub use transport::{HttpTransport, ProbeResponse, ProbeTransport};
pub use writer::ReportWriter;
