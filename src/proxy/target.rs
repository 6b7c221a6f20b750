//! Resolution of the destination every probe is sent to

use crate::{Error, Result};
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::info;

/// Public service that echoes the caller's IP
pub const DEFAULT_ECHO_URL: &str = "https://httpbin.org/ip";

/// Default port for the local-address target
pub const DEFAULT_LOCAL_PORT: u16 = 80;

/// Well-known address used only to pick the outbound interface; nothing is sent
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// How the probe destination is chosen for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPolicy {
    /// A fixed "what is my IP" endpoint
    Echo { url: String },
    /// The operator machine's own outward-facing address
    LocalAddress { port: u16 },
}

impl Default for TargetPolicy {
    fn default() -> Self {
        TargetPolicy::Echo {
            url: DEFAULT_ECHO_URL.to_string(),
        }
    }
}

impl TargetPolicy {
    /// Resolve the policy into the URL every probe requests
    pub async fn resolve(&self) -> Result<String> {
        let target = match self {
            TargetPolicy::Echo { url } => {
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| Error::InvalidTarget(format!("{}: {}", url, e)))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(Error::InvalidTarget(format!(
                        "{}: scheme must be http or https",
                        url
                    )));
                }
                parsed.to_string()
            }
            TargetPolicy::LocalAddress { port } => {
                let ip = local_ip().await.map_err(Error::LocalAddress)?;
                format!("http://{}/", SocketAddr::new(ip, *port))
            }
        };

        info!("Probe target: {}", target);
        Ok(target)
    }
}

/// Discover the locally bound address of the default outbound route
async fn local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(ROUTE_PROBE_ADDR).await?;
    let ip = socket.local_addr()?.ip();

    if ip.is_unspecified() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "socket bound to an unspecified address",
        ));
    }
    Ok(ip)
}
