//! The inventory report document produced by the report job.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Prefix under which reports are archived in the output bucket.
pub const REPORT_KEY_PREFIX: &str = "reports/";

pub const REPORT_TITLE: &str = "Minio Inventory Report";

/// Width of the `=` rule under the report header.
const RULE_WIDTH: usize = 60;

/// An assembled, immutable inventory snapshot.
///
/// `generated_at` is the single run time shared by the header line and the
/// remote object key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDocument {
    generated_at: DateTime<Utc>,
    lines: Vec<String>,
}

impl ReportDocument {
    /// Seal a document from its run time and body lines (header excluded).
    pub fn new(generated_at: DateTime<Utc>, body: Vec<String>) -> Self {
        let mut lines = Vec::with_capacity(body.len() + 4);
        lines.push(REPORT_TITLE.to_string());
        lines.push(format!("Generated: {}", iso_timestamp(&generated_at)));
        lines.push("=".repeat(RULE_WIDTH));
        lines.push(String::new());
        lines.extend(body);
        Self {
            generated_at,
            lines,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-joined text of the whole document.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Remote key: `reports/{YYYYMMDD_HHMMSS}_{basename of local_file}`.
    pub fn remote_key(&self, local_file: &Path) -> String {
        let basename = local_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| local_file.to_string_lossy().into_owned());
        format!(
            "{}{}_{}",
            REPORT_KEY_PREFIX,
            self.generated_at.format("%Y%m%d_%H%M%S"),
            basename
        )
    }
}

/// ISO-8601 rendering used throughout the gateway and the report.
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap()
    }

    #[test]
    fn header_carries_title_timestamp_and_rule() {
        let doc = ReportDocument::new(run_time(), vec!["BUCKET: a".into()]);
        let lines = doc.lines();
        assert_eq!(lines[0], "Minio Inventory Report");
        assert_eq!(lines[1], "Generated: 2025-03-07T14:05:09Z");
        assert_eq!(lines[2], "=".repeat(60));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "BUCKET: a");
    }

    #[test]
    fn render_joins_with_newlines() {
        let doc = ReportDocument::new(run_time(), vec!["x".into(), "y".into()]);
        assert!(doc.render().ends_with("\n\nx\ny"));
        assert!(!doc.render().ends_with('\n'));
    }

    #[test]
    fn remote_key_uses_run_time_and_basename() {
        let doc = ReportDocument::new(run_time(), Vec::new());
        let key = doc.remote_key(Path::new("/tmp/out/bucket-objects-report.txt"));
        assert_eq!(key, "reports/20250307_140509_bucket-objects-report.txt");
    }
}
