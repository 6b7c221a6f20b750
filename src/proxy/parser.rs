//! Loader for per-protocol proxy source files

use crate::proxy::models::{Endpoint, ProxyType};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{info, warn};

/// `IP:PORT` at the start of a line, optionally followed by `:COUNTRY`
///
/// The country is everything after the second colon.
static ENDPOINT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d+)(?::\s*(\S.*))?")
        .expect("Invalid endpoint regex")
});

/// Parser for proxy source lines and files
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single source line
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - IP:PORT:COUNTRY
    ///
    /// Trailing text after the leading `IP:PORT` is ignored unless it starts with `:`.
    pub fn parse_line(line: &str, proxy_type: ProxyType) -> Option<Endpoint> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let caps = ENDPOINT_REGEX.captures(line)?;
        let host: Ipv4Addr = caps[1].parse().ok()?;
        let port: u16 = caps[2].parse().ok()?;

        let endpoint = Endpoint::new(host, port, proxy_type);
        match caps.get(3).map(|m| m.as_str().trim()) {
            Some(country) if !country.is_empty() => Some(endpoint.with_country(country)),
            _ => Some(endpoint),
        }
    }

    /// Parse endpoints from a string (multiple lines)
    pub fn parse_string(content: &str, proxy_type: ProxyType) -> Vec<Endpoint> {
        content
            .lines()
            .filter_map(|line| Self::parse_line(line, proxy_type))
            .collect()
    }

    /// Parse endpoints from a file
    pub fn parse_file<P: AsRef<Path>>(path: P, proxy_type: ProxyType) -> Result<Vec<Endpoint>> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let content = decode_text(&bytes).unwrap_or_else(|| {
            warn!("{} is not valid UTF-8, decoding as Latin-1", path.display());
            decode_latin1(&bytes)
        });
        Ok(Self::parse_string(&content, proxy_type))
    }

    /// Load every per-protocol source file from `dir`
    ///
    /// Missing or unreadable files are skipped with a warning.
    pub fn load_sources<P: AsRef<Path>>(dir: P) -> Vec<Endpoint> {
        let dir = dir.as_ref();
        let mut endpoints = Vec::new();

        for proxy_type in ProxyType::ALL {
            let path = dir.join(proxy_type.source_file_name());
            match Self::parse_file(&path, proxy_type) {
                Ok(parsed) => {
                    info!(
                        "Loaded {} {} proxies from {}",
                        parsed.len(),
                        proxy_type,
                        path.display()
                    );
                    endpoints.extend(parsed);
                }
                Err(crate::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    warn!("{} not found, skipping", path.display());
                }
                Err(e) => {
                    warn!("Could not read {}: {}", path.display(), e);
                }
            }
        }

        endpoints
    }
}

fn decode_text(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    Some(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

/// Every byte maps to the code point of the same value, so this never fails
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_table() {
        let cases: &[(&str, Option<(&str, Option<&str>)>)] = &[
            ("192.168.1.1:8080", Some(("192.168.1.1:8080", None))),
            ("  10.0.0.1:3128  ", Some(("10.0.0.1:3128", None))),
            ("1.2.3.4:1080:US", Some(("1.2.3.4:1080", Some("US")))),
            ("1.2.3.4:1080:United States", Some(("1.2.3.4:1080", Some("United States")))),
            ("1.2.3.4:80:Korea, Republic of", Some(("1.2.3.4:80", Some("Korea, Republic of")))),
            (
                "1.2.3.4:80:Korea, Democratic People's Republic of",
                Some(("1.2.3.4:80", Some("Korea, Democratic People's Republic of"))),
            ),
            ("1.2.3.4:80:Trinidad & Tobago", Some(("1.2.3.4:80", Some("Trinidad & Tobago")))),
            ("1.2.3.4:80: Bosnia/Herzegovina ", Some(("1.2.3.4:80", Some("Bosnia/Herzegovina")))),
            ("1.2.3.4:80:Region 51", Some(("1.2.3.4:80", Some("Region 51")))),
            ("1.2.3.4:80:", Some(("1.2.3.4:80", None))),
            ("5.6.7.8:80 some trailing note", Some(("5.6.7.8:80", None))),
            ("", None),
            ("# comment", None),
            ("invalid", None),
            ("192.168.1.1", None),
            ("192.168.1.1:abc", None),
            ("host.example.com:8080", None),
            ("x 1.2.3.4:8080", None),
            ("300.1.1.1:8080", None),
            ("1.2.3.4:70000", None),
        ];

        for (line, expected) in cases {
            let parsed = ProxyParser::parse_line(line, ProxyType::Http);
            match expected {
                Some((address, country)) => {
                    let endpoint =
                        parsed.unwrap_or_else(|| panic!("expected a match for {:?}", line));
                    assert_eq!(endpoint.address(), *address, "line {:?}", line);
                    assert_eq!(endpoint.country.as_deref(), *country, "line {:?}", line);
                }
                None => assert!(parsed.is_none(), "expected no match for {:?}", line),
            }
        }
    }

    #[test]
    fn test_parse_string_keeps_duplicates() {
        let content = "1.1.1.1:80\n1.1.1.1:80\nnot a proxy\n2.2.2.2:8080:DE\n";
        let endpoints = ProxyParser::parse_string(content, ProxyType::Socks5);
        assert_eq!(endpoints.len(), 3);
        assert!(endpoints.iter().all(|e| e.proxy_type == ProxyType::Socks5));
    }

    #[test]
    fn test_empty_and_malformed_content() {
        assert!(ProxyParser::parse_string("", ProxyType::Http).is_empty());
        assert!(ProxyParser::parse_string("foo\nbar:baz\n\n", ProxyType::Http).is_empty());
    }

    #[test]
    fn test_parse_file_latin1_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("http.txt");
        // 0xE7 is 'ç' in Latin-1 and invalid as a lone UTF-8 byte
        fs::write(&path, b"1.2.3.4:8080:Cura\xE7ao\n5.6.7.8:3128\n").unwrap();

        let endpoints = ProxyParser::parse_file(&path, ProxyType::Http).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].country.as_deref(), Some("Curaçao"));
        assert_eq!(endpoints[1].address(), "5.6.7.8:3128");
    }

    #[test]
    fn test_load_sources_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("http.txt"), "1.2.3.4:8080\n").unwrap();
        fs::write(dir.path().join("socks5.txt"), "5.6.7.8:1080:FR\n9.9.9.9:1080\n").unwrap();

        let endpoints = ProxyParser::load_sources(dir.path());
        assert_eq!(endpoints.len(), 3);
        assert_eq!(
            endpoints.iter().filter(|e| e.proxy_type == ProxyType::Socks5).count(),
            2
        );
    }

    #[test]
    fn test_load_sources_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProxyParser::load_sources(dir.path()).is_empty());
    }

    #[test]
    fn test_connect_source_keeps_its_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("connect.txt"), "1.2.3.4:8080\n").unwrap();

        let endpoints = ProxyParser::load_sources(dir.path());
        assert_eq!(endpoints[0].proxy_type, ProxyType::Connect);
        assert_eq!(endpoints[0].url(), "http://1.2.3.4:8080");
    }
}
