use anyhow::Result;
use clap::{Parser, ValueEnum};
use proxy_probe::{
    proxy::{
        checker::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS},
        target::{DEFAULT_ECHO_URL, DEFAULT_LOCAL_PORT},
        CheckerConfig, HttpTransport, TargetPolicy,
    },
    run, RunConfig, DEFAULT_OUTPUT_DIR,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Probe proxy lists and write grouped reports of the working ones
#[derive(Parser)]
#[command(name = "proxy-probe")]
#[command(about = "Probe HTTP, HTTPS, SOCKS4 and SOCKS5 proxies and report the working ones")]
struct Cli {
    /// Directory containing connect.txt, http.txt, https.txt, socks4.txt, socks5.txt
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory to write reports to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum number of concurrent probes
    #[arg(short = 'n', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Timeout per probe in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Where probes are sent
    #[arg(long, value_enum, default_value_t = Target::Echo)]
    target: Target,

    /// URL used by the echo target
    #[arg(long, default_value = DEFAULT_ECHO_URL)]
    echo_url: String,

    /// Port used by the local target
    #[arg(long, default_value_t = DEFAULT_LOCAL_PORT)]
    local_port: u16,

    /// MaxMind database used to fill in missing countries
    #[arg(long)]
    mmdb: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    /// A public "what is my IP" service
    Echo,
    /// This machine's outward-facing address
    Local,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut checker = CheckerConfig::new()
            .with_concurrency(self.concurrency)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(path) = self.mmdb {
            checker = checker.with_mmdb_path(path);
        }

        let target = match self.target {
            Target::Echo => TargetPolicy::Echo { url: self.echo_url },
            Target::Local => TargetPolicy::LocalAddress {
                port: self.local_port,
            },
        };

        RunConfig {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            checker,
            target,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    let report = run(&config, HttpTransport::new()).await?;

    println!(
        "{} of {} proxies working. Reports generated:",
        report.working, report.loaded
    );
    for path in &report.files {
        println!("  {}", path.display());
    }

    Ok(())
}
