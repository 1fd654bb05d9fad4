//! Aggregation pipeline builders.
//!
//! Pure functions returning BSON so the shapes can be asserted without a
//! server. `InMemoryStore` evaluates the same semantics in Rust.

use mongodb::bson::{Bson, Document, doc};
use tracing::trace;

use crate::record::{
    FIELD_ASYLUM, FIELD_COUNTRY, FIELD_ISO, FIELD_REFUGEES, FIELD_YEAR, MigrationFilter,
};

/// Number of origin countries kept in [`crate::StatsBundle::top_origins`].
pub const TOP_ORIGINS_LIMIT: i64 = 5;

/// `$convert` of a count column to `long`; non-numeric and null become `0`.
pub fn coerce_count_expr(field: &str) -> Bson {
    Bson::Document(doc! {
        "$convert": {
            "input": format!("${field}"),
            "to": "long",
            "onError": 0_i64,
            "onNull": 0_i64,
        }
    })
}

/// Query document for a filter; absent or unconstrained filters give `{}`.
pub fn filter_document(filter: Option<&MigrationFilter>) -> Document {
    let mut query = Document::new();
    let Some(f) = filter else {
        return query;
    };

    if let Some(countries) = &f.countries {
        query.insert(FIELD_COUNTRY, doc! { "$in": countries.clone() });
    }
    if let Some(range) = f.years {
        query.insert(FIELD_YEAR, doc! { "$gte": range.min, "$lte": range.max });
    }
    trace!(?query, "pipelines::filter_document");
    query
}

pub fn match_stage(filter: Option<&MigrationFilter>) -> Document {
    doc! { "$match": filter_document(filter) }
}

fn numeric_year_stage() -> Document {
    doc! { "$match": { FIELD_YEAR: { "$type": "number" } } }
}

/// Drops fractional years. Runs after [`numeric_year_stage`] so `$trunc`
/// only ever sees numbers.
fn whole_year_stage() -> Document {
    let year = format!("${FIELD_YEAR}");
    doc! { "$match": { "$expr": { "$eq": [ year.as_str(), { "$trunc": [ year.as_str(), 0 ] } ] } } }
}

/// Refugee and asylum totals per year, ascending.
pub fn by_year_pipeline(filter: Option<&MigrationFilter>) -> Vec<Document> {
    vec![
        match_stage(filter),
        numeric_year_stage(),
        whole_year_stage(),
        doc! {
            "$group": {
                "_id": format!("${FIELD_YEAR}"),
                "total_refugees": { "$sum": coerce_count_expr(FIELD_REFUGEES) },
                "total_asylum": { "$sum": coerce_count_expr(FIELD_ASYLUM) },
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Top origin countries by refugee total, ties broken by name.
pub fn top_origins_pipeline(filter: Option<&MigrationFilter>) -> Vec<Document> {
    vec![
        match_stage(filter),
        doc! { "$match": { FIELD_COUNTRY: { "$type": "string" } } },
        doc! {
            "$group": {
                "_id": format!("${FIELD_COUNTRY}"),
                "total_refugees": { "$sum": coerce_count_expr(FIELD_REFUGEES) },
                "iso_code": { "$first": format!("${FIELD_ISO}") },
            }
        },
        doc! { "$sort": { "total_refugees": -1, "_id": 1 } },
        doc! { "$limit": TOP_ORIGINS_LIMIT },
    ]
}

/// Single `{ _id: null, min, max }` document, or nothing if no numeric year exists.
pub fn year_bounds_pipeline() -> Vec<Document> {
    vec![
        numeric_year_stage(),
        whole_year_stage(),
        doc! {
            "$group": {
                "_id": Bson::Null,
                "min": { "$min": format!("${FIELD_YEAR}") },
                "max": { "$max": format!("${FIELD_YEAR}") },
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_filter_matches_everything() {
        assert_eq!(filter_document(None), Document::new());
        assert_eq!(filter_document(Some(&MigrationFilter::all())), Document::new());
    }

    #[test]
    fn filter_document_uses_in_and_inclusive_range() {
        let f = MigrationFilter::all()
            .with_countries(["Syria", "Iraq"])
            .with_years(2018, 2020);
        assert_eq!(
            filter_document(Some(&f)),
            doc! {
                "Country of Origin": { "$in": ["Syria", "Iraq"] },
                "Year": { "$gte": 2018, "$lte": 2020 },
            }
        );
    }

    #[test]
    fn by_year_sorts_ascending_after_grouping() {
        let p = by_year_pipeline(None);
        assert_eq!(p.len(), 5);
        assert!(p[3].contains_key("$group"));
        assert_eq!(p[4], doc! { "$sort": { "_id": 1 } });
    }

    #[test]
    fn grouping_and_bounds_skip_fractional_years() {
        let whole = whole_year_stage();
        assert_eq!(by_year_pipeline(None)[1], numeric_year_stage());
        assert_eq!(by_year_pipeline(None)[2], whole);
        assert_eq!(year_bounds_pipeline()[1], whole);
        let expr = whole.get_document("$match").unwrap().get_document("$expr").unwrap();
        assert!(expr.contains_key("$eq"));
    }

    #[test]
    fn counts_are_converted_with_zero_fallbacks() {
        let expr = coerce_count_expr("Refugees");
        let conv = expr.as_document().unwrap().get_document("$convert").unwrap();
        assert_eq!(conv.get_str("input").unwrap(), "$Refugees");
        assert_eq!(conv.get_i64("onError").unwrap(), 0);
        assert_eq!(conv.get_i64("onNull").unwrap(), 0);
    }

    #[test]
    fn top_origins_is_limited_to_five() {
        let p = top_origins_pipeline(None);
        assert_eq!(p.last(), Some(&doc! { "$limit": 5_i64 }));
        assert_eq!(p[3], doc! { "$sort": { "total_refugees": -1, "_id": 1 } });
    }
}
