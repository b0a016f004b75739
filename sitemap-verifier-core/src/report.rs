// Persistence and summary of verification results

use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitemap_verifier_scanner::result::VerificationRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// `<host>_<unix timestamp>.json`
pub fn output_filename(sitemap_url: &Url, unix_timestamp: i64) -> String {
    let host = sitemap_url.host_str().unwrap_or("sitemap");
    format!("{}_{}.json", host, unix_timestamp)
}

/// Output location for a run started now; bare filename without a directory
pub fn output_path(output_dir: Option<&Path>, sitemap_url: &Url) -> PathBuf {
    let filename = output_filename(sitemap_url, Utc::now().timestamp());
    match output_dir {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Write the records as a pretty-printed JSON array
pub fn save_json_report(records: &[VerificationRecord], path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    fs::write(path, json)?;

    info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub verified: usize,
    pub unverified: usize,
    pub by_status: BTreeMap<String, usize>,
}

impl ReportSummary {
    pub fn from_records(records: &[VerificationRecord]) -> Self {
        let mut summary = ReportSummary {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            if record.verified {
                summary.verified += 1;
            } else {
                summary.unverified += 1;
            }
            if let Some(ref status) = record.status_code {
                *summary.by_status.entry(status.clone()).or_default() += 1;
            }
        }

        summary
    }
}

/// Plain-text stats dump
pub fn generate_summary(records: &[VerificationRecord]) -> String {
    let summary = ReportSummary::from_records(records);

    let mut report = String::new();
    report.push_str(&format!("URLs checked: {}\n", summary.total));
    report.push_str(&format!("  Verified: {}\n", summary.verified));
    report.push_str(&format!("  Unverified: {}\n", summary.unverified));

    for (status, count) in &summary.by_status {
        report.push_str(&format!("  HTTP {}: {}\n", status, count));
    }

    report
}
