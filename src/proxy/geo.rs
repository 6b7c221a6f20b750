//! Country lookup for proxy IPs using a MaxMind database

use crate::{Error, Result};
use maxminddb::{geoip2, Reader};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;

/// Resolves proxy IPs to ISO country codes
#[derive(Clone)]
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Open an MMDB file (GeoLite2-City or GeoLite2-Country)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path).map_err(|e| Error::Geo(e.to_string()))?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// ISO 3166-1 alpha-2 code for the address, if the database knows it
    pub fn country_code(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        let lookup_result = self
            .reader
            .lookup(IpAddr::V4(ip))
            .map_err(|e| Error::Geo(e.to_string()))?;

        let city: Option<geoip2::City> = lookup_result
            .decode()
            .map_err(|e| Error::Geo(e.to_string()))?;

        Ok(city.and_then(|city| city.country.iso_code.map(String::from)))
    }
}

impl std::fmt::Debug for GeoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoLocator").finish_non_exhaustive()
    }
}
