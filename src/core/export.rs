use crate::core::{AnalyticsReport, Storage};
use crate::domain::model::ymd;
use crate::utils::error::{AnalyticsError, Result};

pub const REPORT_FILE: &str = "report.json";
pub const TREND_FILE: &str = "revenue_trend.csv";

/// Writes a report as pretty JSON plus a `date,revenue` CSV of its trend.
pub struct ReportExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the written file names, relative to the storage root.

    pub async fn export(&self, report: &AnalyticsReport) -> Result<Vec<String>> {
        let json = serde_json::to_vec_pretty(report)?;
        tracing::debug!("Writing {} ({} bytes)", REPORT_FILE, json.len());
        self.storage.write_file(REPORT_FILE, &json).await?;

        let csv = render_trend_csv(report)?;
        tracing::debug!("Writing {} ({} rows)", TREND_FILE, report.revenue_trend.len());
        self.storage.write_file(TREND_FILE, csv.as_bytes()).await?;

        Ok(vec![REPORT_FILE.to_string(), TREND_FILE.to_string()])
    }
}

pub fn render_trend_csv(report: &AnalyticsReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "revenue"])?;
    for point in &report.revenue_trend {
        writer.write_record([
            point.date.format(ymd::FORMAT).to_string(),
            format!("{:.2}", point.revenue),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AnalyticsError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AnalyticsError::ProcessingError {
        message: format!("CSV output was not UTF-8: {}", e),
    })
}
