//! A full probe run: load, resolve target, probe, aggregate, emit

use crate::proxy::{GroupedReport, ProbeTransport, ProxyChecker, ProxyParser, ReportWriter};
use crate::{Error, Result, RunConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub loaded: usize,
    pub working: usize,
    pub files: Vec<PathBuf>,
}

/// Run every phase in order; each phase completes before the next starts
pub async fn run<T: ProbeTransport>(config: &RunConfig, transport: T) -> Result<RunReport> {
    let started = Instant::now();

    info!("Loading proxies from {}", config.input_dir.display());
    let endpoints = ProxyParser::load_sources(&config.input_dir);
    if endpoints.is_empty() {
        return Err(Error::NoEndpoints);
    }
    let loaded = endpoints.len();
    info!("Loaded {} proxies", loaded);

    let target = config.target.resolve().await?;

    let checker = ProxyChecker::with_transport(config.checker.clone(), transport);
    let outcomes = checker.probe_all(endpoints, &target).await;
    if outcomes.is_empty() {
        return Err(Error::NoWorkingProxies);
    }

    let report = GroupedReport::build(outcomes);
    let files = ReportWriter::new(&config.output_dir, target).write(&report)?;

    info!("Run finished in {:?}", started.elapsed());
    Ok(RunReport {
        loaded,
        working: report.total(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::checker::tests::{Reply, StubTransport};
    use crate::proxy::{CheckerConfig, TargetPolicy};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    fn config(root: &Path) -> RunConfig {
        RunConfig {
            input_dir: root.join("lists"),
            output_dir: root.join("proxy_reports"),
            checker: CheckerConfig::new()
                .with_concurrency(4)
                .with_timeout(Duration::from_millis(200)),
            target: TargetPolicy::default(),
        }
    }

    fn table_rows(path: &Path) -> usize {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("| ") && l.contains(':') && !l.starts_with("| Proxy"))
            .count()
    }

    #[tokio::test]
    async fn test_no_endpoints_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("http.txt"), "garbage\n\n").unwrap();

        let transport = StubTransport::new(Duration::from_millis(1), Reply::Status(200));
        let result = run(&config, transport).await;

        assert!(matches!(result, Err(Error::NoEndpoints)));
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_no_working_proxies_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("socks4.txt"), "1.1.1.1:1080\n2.2.2.2:1080\n").unwrap();

        let transport = StubTransport::new(Duration::from_millis(1), Reply::Refused);
        let result = run(&config, transport).await;

        assert!(matches!(result, Err(Error::NoWorkingProxies)));
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_ten_loaded_three_working() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(
            config.input_dir.join("http.txt"),
            "10.0.0.1:80\n10.0.0.2:80:US\n10.0.0.3:80\n10.0.0.4:80\n",
        )
        .unwrap();
        fs::write(
            config.input_dir.join("socks5.txt"),
            "10.0.1.1:1080:DE\n10.0.1.2:1080\n10.0.1.3:1080\n",
        )
        .unwrap();
        fs::write(
            config.input_dir.join("connect.txt"),
            "10.0.2.1:3128\n10.0.2.2:3128\n10.0.2.3:3128\n",
        )
        .unwrap();

        let transport = StubTransport::new(Duration::from_millis(2), Reply::Status(404))
            .reply("10.0.0.2:80", Reply::Status(200))
            .reply("10.0.1.1:1080", Reply::Forwarded)
            .reply("10.0.2.3:3128", Reply::Status(200))
            .reply("10.0.0.4:80", Reply::Refused)
            .reply("10.0.1.3:1080", Reply::Hang);

        let report = run(&config, transport).await.unwrap();
        assert_eq!(report.loaded, 10);
        assert_eq!(report.working, 3);
        assert_eq!(report.files.len(), 4);

        let out = &config.output_dir;
        assert_eq!(table_rows(&out.join("http_proxies.md")), 1);
        assert_eq!(table_rows(&out.join("socks5_proxies.md")), 1);
        assert_eq!(table_rows(&out.join("connect_proxies.md")), 1);
        assert!(!out.join("https_proxies.md").exists());
        assert!(!out.join("socks4_proxies.md").exists());

        let socks5 = fs::read_to_string(out.join("socks5_proxies.md")).unwrap();
        assert!(socks5.contains("10.0.1.1:1080"));
        assert!(socks5.contains("| Anonymous | DE |"));

        let summary = fs::read_to_string(out.join("summary.md")).unwrap();
        assert!(summary.contains("Total working proxies: 3"));
    }
}
