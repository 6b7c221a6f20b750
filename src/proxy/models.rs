//! Proxy data models

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Proxy type enumeration
///
/// The variant order is the order groups appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProxyType {
    /// HTTP CONNECT tunnel; dialled like a plain HTTP proxy
    Connect,
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    /// Every proxy type, one per source file
    pub const ALL: [ProxyType; 5] = [
        ProxyType::Connect,
        ProxyType::Http,
        ProxyType::Https,
        ProxyType::Socks4,
        ProxyType::Socks5,
    ];

    /// Scheme used in the proxy URL handed to the HTTP client
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyType::Connect | ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }

    /// Name of the source file this type is loaded from
    pub fn source_file_name(&self) -> String {
        format!("{}.txt", self)
    }

    /// Name of the per-protocol report file
    pub fn report_file_name(&self) -> String {
        format!("{}_proxies.md", self)
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Connect => write!(f, "connect"),
            ProxyType::Http => write!(f, "http"),
            ProxyType::Https => write!(f, "https"),
            ProxyType::Socks4 => write!(f, "socks4"),
            ProxyType::Socks5 => write!(f, "socks5"),
        }
    }
}

/// A candidate proxy endpoint loaded from a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: Ipv4Addr,
    pub port: u16,
    pub proxy_type: ProxyType,
    pub country: Option<String>,
}

impl Endpoint {
    pub fn new(host: Ipv4Addr, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// The endpoint in IP:PORT format
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Protocol-qualified proxy URL, e.g. `socks5://1.2.3.4:1080`
    pub fn url(&self) -> String {
        format!("{}://{}", self.proxy_type.scheme(), self.address())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// Whether the target could see the caller through the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anonymity {
    HighAnonymity,
    Anonymous,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::HighAnonymity => write!(f, "High Anonymity"),
            Anonymity::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// A successful probe through one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub endpoint: Endpoint,
    pub elapsed: Duration,
    pub anonymity: Anonymity,
    pub country: Option<String>,
}

impl ProbeOutcome {
    pub fn new(endpoint: Endpoint, elapsed: Duration, anonymity: Anonymity) -> Self {
        let country = endpoint.country.clone();
        Self {
            endpoint,
            elapsed,
            anonymity,
            country,
        }
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.endpoint.proxy_type
    }
}
