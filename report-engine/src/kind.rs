//! Report kinds offered in the sidebar.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Narrative report flavours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    #[default]
    HotspotPrediction,
    ImpactAnalysis,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::HotspotPrediction, ReportKind::ImpactAnalysis];

    /// Human label, also used in the report title.
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::HotspotPrediction => "Hotspot Prediction",
            ReportKind::ImpactAnalysis => "Impact Analysis",
        }
    }

    /// `migration_<label lowercased, spaces as underscores>.pdf`
    pub fn file_name(self) -> String {
        format!(
            "migration_{}.pdf",
            self.label().to_lowercase().replace(' ', "_")
        )
    }

    /// `"<label> - <YYYY-MM-DD>"` for the given day.
    pub fn title_on(self, date: NaiveDate) -> String {
        format!("{} - {}", self.label(), date.format("%Y-%m-%d"))
    }

    /// Title using today's local date.
    pub fn title(self) -> String {
        self.title_on(Local::now().date_naive())
    }
}

pub const PDF_MIME: &str = "application/pdf";
