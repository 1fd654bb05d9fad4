use report_engine::ReportKind;
use serde::Deserialize;

use crate::{core::session::ReportSelection, error_handler::AppError};

/// One country or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CountrySelection {
    One(String),
    Many(Vec<String>),
}

impl CountrySelection {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CountrySelection::One(c) => vec![c],
            CountrySelection::Many(list) => list,
        }
    }
}

/// Request payload for POST /reports. Omitted fields use the sidebar defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub countries: Option<CountrySelection>,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
    #[serde(default)]
    pub kind: ReportKind,
}

impl ReportRequest {
    /// Checks the year range shape and converts to a session selection.
    pub fn into_selection(self) -> Result<ReportSelection, AppError> {
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(AppError::BadRequest(format!(
                    "year_from ({from}) must not be after year_to ({to})"
                )));
            }
        }
        Ok(ReportSelection {
            countries: self.countries.map(CountrySelection::into_vec),
            year_from: self.year_from,
            year_to: self.year_to,
            kind: self.kind,
        })
    }
}
