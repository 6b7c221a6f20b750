//! Markdown report files for a grouped report

use crate::proxy::report::{GroupedReport, ProtocolGroup};
use crate::{Error, Result};
use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the summary file in the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Writes one report per protocol group plus a summary
pub struct ReportWriter {
    output_dir: PathBuf,
    target: String,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, target: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            target: target.into(),
        }
    }

    /// Write every report file and return their paths
    ///
    /// Nothing is written when the report has no working proxies.
    pub fn write(&self, report: &GroupedReport) -> Result<Vec<PathBuf>> {
        if report.is_empty() {
            return Err(Error::NoWorkingProxies);
        }

        fs::create_dir_all(&self.output_dir)?;
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut written = Vec::new();

        for group in report.groups() {
            let path = self.output_dir.join(group.proxy_type.report_file_name());
            fs::write(&path, self.render_group(group, &generated))?;
            info!("Wrote {} {} proxies to {}", group.len(), group.proxy_type, path.display());
            written.push(path);
        }

        let summary_path = self.output_dir.join(SUMMARY_FILE);
        fs::write(&summary_path, self.render_summary(report, &generated))?;
        written.push(summary_path);

        Ok(written)
    }

    fn render_group(&self, group: &ProtocolGroup, generated: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {} Proxy Report\n", group.proxy_type.to_string().to_uppercase());
        let _ = writeln!(out, "Generated: {}  ", generated);
        let _ = writeln!(out, "Target: {}\n", self.target);
        out.push_str("| Proxy | Response Time (s) | Anonymity | Country |\n");
        out.push_str("|-------|-------------------|-----------|---------|\n");

        for outcome in &group.outcomes {
            let _ = writeln!(
                out,
                "| {} | {:.2} | {} | {} |",
                outcome.endpoint.address(),
                outcome.elapsed.as_secs_f64(),
                outcome.anonymity,
                outcome.country.as_deref().unwrap_or("-")
            );
        }

        out
    }

    fn render_summary(&self, report: &GroupedReport, generated: &str) -> String {
        let mut out = String::new();
        out.push_str("# Proxy Test Summary\n\n");
        let _ = writeln!(out, "Generated: {}  ", generated);
        let _ = writeln!(out, "Target: {}  ", self.target);
        let _ = writeln!(out, "Total working proxies: {}\n", report.total());

        out.push_str("| Type | Count | Avg Response Time (s) |\n");
        out.push_str("|------|-------|-----------------------|\n");
        for group in report.groups() {
            let _ = writeln!(
                out,
                "| {} | {} | {:.2} |",
                group.proxy_type,
                group.len(),
                group.average.as_secs_f64()
            );
        }

        out.push_str("\n## Top Countries\n");
        for group in report.groups() {
            let _ = writeln!(out, "\n### {}\n", group.proxy_type);
            if group.top_countries.is_empty() {
                out.push_str("No country data.\n");
                continue;
            }
            for (country, count) in &group.top_countries {
                let _ = writeln!(out, "- {}: {}", country, count);
            }
        }

        out
    }
}
