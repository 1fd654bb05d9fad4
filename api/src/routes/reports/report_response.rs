use chrono::{DateTime, Utc};
use migration_store::{MigrationFilter, MigrationRecord};
use report_engine::ReportKind;
use serde::Serialize;

use crate::core::session::ReportArtifact;

/// Where the PDF of the latest report can be fetched.
pub const PDF_DOWNLOAD_PATH: &str = "/reports/latest/pdf";

/// Report metadata and narrative text (the PDF is served separately).
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub kind: ReportKind,
    pub label: &'static str,
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub download_url: &'static str,
    pub record_count: usize,
    pub pdf_bytes: usize,
    pub filter: MigrationFilter,
    pub generated_at: DateTime<Utc>,
}

impl From<&ReportArtifact> for ReportResponse {
    fn from(a: &ReportArtifact) -> Self {
        Self {
            kind: a.kind,
            label: a.kind.label(),
            title: a.title.clone(),
            text: a.text.clone(),
            file_name: a.file_name.clone(),
            download_url: PDF_DOWNLOAD_PATH,
            record_count: a.records.len(),
            pdf_bytes: a.pdf.len(),
            filter: a.filter.clone(),
            generated_at: a.generated_at,
        }
    }
}

/// Raw-data preview: the report's records, sorted by year.
#[derive(Debug, Serialize)]
pub struct ReportDataResponse<'a> {
    pub count: usize,
    pub records: &'a [MigrationRecord],
}
