//! Core data models used by the library.

use std::collections::BTreeMap;

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Stored field names. The collection was loaded from a spreadsheet export,
/// hence the spaces.
pub const FIELD_COUNTRY: &str = "Country of Origin";
pub const FIELD_ISO: &str = "Country of Origin ISO";
pub const FIELD_YEAR: &str = "Year";
pub const FIELD_REFUGEES: &str = "Refugees";
pub const FIELD_ASYLUM: &str = "Asylum Seekers";

/// One (country of origin, year) observation with counts already coerced.
///
/// Columns other than the five known ones are carried in `extra` untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MigrationRecord {
    #[serde(rename = "Country of Origin")]
    pub country_of_origin: String,
    #[serde(rename = "Country of Origin ISO")]
    pub iso_code: String,
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Refugees")]
    pub refugees: i64,
    #[serde(rename = "Asylum Seekers")]
    pub asylum_seekers: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Bson>,
}

impl MigrationRecord {
    /// Builds a record from a stored document, dropping `_id`.
    ///
    /// Never fails: text fields fall back to `""`, counts to `0`, year to `None`.
    pub fn from_document(mut doc: Document) -> Self {
        doc.remove("_id");

        let country_of_origin = text(doc.remove(FIELD_COUNTRY));
        let iso_code = text(doc.remove(FIELD_ISO));
        let year = doc.remove(FIELD_YEAR).as_ref().and_then(coerce_year);
        let refugees = coerce_count(doc.get(FIELD_REFUGEES));
        let asylum_seekers = coerce_count(doc.get(FIELD_ASYLUM));
        doc.remove(FIELD_REFUGEES);
        doc.remove(FIELD_ASYLUM);

        Self {
            country_of_origin,
            iso_code,
            year,
            refugees,
            asylum_seekers,
            extra: doc.into_iter().collect(),
        }
    }
}

fn text(value: Option<Bson>) -> String {
    match value {
        Some(Bson::String(s)) => s,
        Some(Bson::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Coerces a stored count to an integer; anything unusable counts as `0`.
///
/// Mirrors `$convert { to: "long", onError: 0, onNull: 0 }`:
/// - integers as-is, doubles truncated toward zero, booleans as `1`/`0`
/// - strings parsed as base-10 integers, otherwise `0`
/// - null, missing, and every other type → `0`
pub fn coerce_count(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) if v.is_finite() => v.trunc() as i64,
        Some(Bson::Boolean(b)) => i64::from(*b),
        Some(Bson::String(s)) => s.parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Year of a whole-number BSON value; the unit of grouping and bounds.
///
/// Fractional doubles are not years and are skipped, as the pipelines do.
pub fn numeric_year(value: &Bson) -> Option<i32> {
    match value {
        Bson::Int32(v) => Some(*v),
        Bson::Int64(v) => i32::try_from(*v).ok(),
        Bson::Double(v) if v.is_finite() && v.fract() == 0.0 => {
            let y = *v as i64;
            i32::try_from(y).ok()
        }
        _ => None,
    }
}

/// Any numeric BSON value, compared the way `$gte`/`$lte` compare numbers.
fn numeric_value(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) if !v.is_nan() => Some(*v),
        _ => None,
    }
}

/// Year for display: numeric values plus year-like strings.
pub fn coerce_year(value: &Bson) -> Option<i32> {
    match value {
        Bson::String(s) => s.trim().parse::<i32>().ok(),
        other => numeric_year(other),
    }
}

/// Inclusive year range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// Transient query built from the user's selections.
///
/// `None` means "no constraint" on that dimension. `Some(vec![])` for
/// countries matches nothing, the same as an empty `$in`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationFilter {
    pub countries: Option<Vec<String>>,
    pub years: Option<YearRange>,
}

impl MigrationFilter {
    /// Filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = Some(countries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_years(mut self, min: i32, max: i32) -> Self {
        self.years = Some(YearRange::new(min, max));
        self
    }

    /// Evaluates the filter against a stored document with `$match` semantics.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(countries) = &self.countries {
            let Ok(country) = doc.get_str(FIELD_COUNTRY) else {
                return false;
            };
            if !countries.iter().any(|c| c == country) {
                return false;
            }
        }
        if let Some(range) = self.years {
            match doc.get(FIELD_YEAR).and_then(numeric_value) {
                Some(y) if f64::from(range.min) <= y && y <= f64::from(range.max) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Totals for one year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub year: i32,
    pub total_refugees: i64,
    pub total_asylum: i64,
}

/// Totals for one origin country, with one ISO code sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OriginTotals {
    pub country: String,
    pub total_refugees: i64,
    pub iso_code: Option<String>,
}

/// Aggregates recomputed on each request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsBundle {
    /// Ascending by year, one entry per year.
    pub by_year: Vec<YearTotals>,
    /// At most [`crate::pipelines::TOP_ORIGINS_LIMIT`], descending by refugees.
    pub top_origins: Vec<OriginTotals>,
}

/// Live min/max of the year column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}
