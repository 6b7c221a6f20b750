//! Network layer used by the checker to send one request through a proxy

use crate::proxy::models::Endpoint;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::{Duration, Instant};

/// Status and headers of a response received through a proxy
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Time from sending the request to receiving the response headers
    pub elapsed: Duration,
}

impl ProbeResponse {
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            elapsed,
        }
    }
}

/// Sends a single GET request to `target` through `endpoint`
///
/// `ProbeResponse::elapsed` covers the request only, not client setup.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        target: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse>;
}

/// `reqwest` backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    /// Create a reqwest client routing both HTTP and HTTPS through the endpoint
    fn create_client(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Client> {
        let proxy = ReqwestProxy::all(endpoint.url())?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(client)
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        target: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse> {
        let client = self.create_client(endpoint, timeout)?;

        let start = Instant::now();
        let response = client.get(target).send().await?;
        let elapsed = start.elapsed();

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::ProxyType;
    use std::net::Ipv4Addr;

    #[test]
    fn test_client_accepts_every_proxy_scheme() {
        let transport = HttpTransport::new();
        for proxy_type in ProxyType::ALL {
            let endpoint = Endpoint::new(Ipv4Addr::new(127, 0, 0, 1), 8080, proxy_type);
            assert!(
                transport.create_client(&endpoint, Duration::from_secs(5)).is_ok(),
                "{} client",
                proxy_type
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_through_closed_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = Endpoint::new(Ipv4Addr::LOCALHOST, port, ProxyType::Http);
        let result = HttpTransport::new()
            .fetch(&endpoint, "http://example.com/", Duration::from_secs(2))
            .await;
        assert!(result.is_err());
    }
}
