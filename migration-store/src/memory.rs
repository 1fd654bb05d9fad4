//! In-memory store with the same semantics as the MongoDB pipelines.

use std::collections::BTreeMap;

use mongodb::bson::{Bson, Document};
use tracing::trace;

use crate::{
    MigrationStore, StoreFuture,
    errors::StoreError,
    pipelines::TOP_ORIGINS_LIMIT,
    record::{
        FIELD_ASYLUM, FIELD_COUNTRY, FIELD_ISO, FIELD_REFUGEES, FIELD_YEAR, MigrationFilter,
        MigrationRecord, OriginTotals, StatsBundle, YearBounds, YearTotals, coerce_count,
        numeric_year,
    },
};

/// Documents held in insertion order; every query re-scans them.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    docs: Vec<Document>,
}

impl InMemoryStore {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    fn matching<'a>(
        &'a self,
        filter: Option<&'a MigrationFilter>,
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.docs
            .iter()
            .filter(move |d| filter.is_none_or(|f| f.matches(d)))
    }

    fn compute_stats(&self, filter: Option<&MigrationFilter>) -> StatsBundle {
        let mut years: BTreeMap<i32, (i64, i64)> = BTreeMap::new();
        // country -> (total, first ISO seen, including a missing one)
        let mut origins: BTreeMap<&str, (i64, Option<String>)> = BTreeMap::new();

        for d in self.matching(filter) {
            let refugees = coerce_count(d.get(FIELD_REFUGEES));

            if let Some(year) = d.get(FIELD_YEAR).and_then(numeric_year) {
                let e = years.entry(year).or_default();
                e.0 = e.0.saturating_add(refugees);
                e.1 = e.1.saturating_add(coerce_count(d.get(FIELD_ASYLUM)));
            }

            if let Ok(country) = d.get_str(FIELD_COUNTRY) {
                let e = origins.entry(country).or_insert_with(|| {
                    let iso = match d.get(FIELD_ISO) {
                        Some(Bson::String(s)) => Some(s.clone()),
                        _ => None,
                    };
                    (0, iso)
                });
                e.0 = e.0.saturating_add(refugees);
            }
        }

        let by_year = years
            .into_iter()
            .map(|(year, (total_refugees, total_asylum))| YearTotals {
                year,
                total_refugees,
                total_asylum,
            })
            .collect();

        // BTreeMap iteration is name-ascending; the stable sort keeps that as the tie-break.
        let mut top: Vec<OriginTotals> = origins
            .into_iter()
            .map(|(country, (total_refugees, iso_code))| OriginTotals {
                country: country.to_string(),
                total_refugees,
                iso_code,
            })
            .collect();
        top.sort_by(|a, b| b.total_refugees.cmp(&a.total_refugees));
        top.truncate(TOP_ORIGINS_LIMIT as usize);

        StatsBundle {
            by_year,
            top_origins: top,
        }
    }
}

impl MigrationStore for InMemoryStore {
    fn stats<'a>(&'a self, filter: Option<&'a MigrationFilter>) -> StoreFuture<'a, StatsBundle> {
        Box::pin(async move { Ok::<_, StoreError>(self.compute_stats(filter)) })
    }

    fn raw<'a>(
        &'a self,
        filter: Option<&'a MigrationFilter>,
    ) -> StoreFuture<'a, Vec<MigrationRecord>> {
        Box::pin(async move {
            let out: Vec<MigrationRecord> = self
                .matching(filter)
                .cloned()
                .map(MigrationRecord::from_document)
                .collect();
            trace!(records = out.len(), "InMemoryStore::raw");
            Ok::<_, StoreError>(out)
        })
    }

    fn distinct_countries(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(async move {
            let mut out: Vec<String> = self
                .docs
                .iter()
                .filter_map(|d| d.get_str(FIELD_COUNTRY).ok())
                .map(str::to_string)
                .collect();
            out.sort();
            out.dedup();
            Ok::<_, StoreError>(out)
        })
    }

    fn year_bounds(&self) -> StoreFuture<'_, Option<YearBounds>> {
        Box::pin(async move {
            let years = self
                .docs
                .iter()
                .filter_map(|d| d.get(FIELD_YEAR).and_then(numeric_year));
            Ok::<_, StoreError>(years.fold(None, |acc: Option<YearBounds>, y| match acc {
                None => Some(YearBounds { min: y, max: y }),
                Some(b) => Some(YearBounds {
                    min: b.min.min(y),
                    max: b.max.max(y),
                }),
            }))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok::<_, StoreError>(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn row(country: &str, iso: &str, year: i32, refugees: &str, asylum: &str) -> Document {
        doc! {
            "Country of Origin": country,
            "Country of Origin ISO": iso,
            "Year": year,
            "Refugees": refugees,
            "Asylum Seekers": asylum,
        }
    }

    fn sample() -> InMemoryStore {
        InMemoryStore::new(vec![
            row("Syria", "SYR", 2019, "6600000", "120000"),
            row("Syria", "SYR", 2017, "6300000", "140000"),
            row("Iraq", "IRQ", 2019, "340000", "n/a"),
            row("Syria", "SYR", 2021, "6800000", "110000"),
            row("Afghanistan", "AFG", 2018, "2700000", "310000"),
            row("Syria", "SYR", 2018, "6650000", ""),
            row("Somalia", "SOM", 2018, "950000", "60000"),
            row("Sudan", "SDN", 2020, "780000", "70000"),
            row("Eritrea", "ERI", 2020, "520000", "50000"),
            row("Myanmar", "MMR", 2020, "1100000", "40000"),
            row("Syria", "SYR", 2020, "6700000", "100000"),
        ])
    }

    #[tokio::test]
    async fn by_year_is_ascending_and_unique() {
        let stats = sample().stats(None).await.unwrap();
        let years: Vec<i32> = stats.by_year.iter().map(|t| t.year).collect();
        assert_eq!(years, vec![2017, 2018, 2019, 2020, 2021]);

        let y2019 = &stats.by_year[2];
        assert_eq!(y2019.total_refugees, 6_600_000 + 340_000);
        // "n/a" contributes nothing.
        assert_eq!(y2019.total_asylum, 120_000);
    }

    #[tokio::test]
    async fn top_origins_are_capped_and_descending() {
        let stats = sample().stats(None).await.unwrap();
        assert_eq!(stats.top_origins.len(), 5);
        assert!(
            stats
                .top_origins
                .windows(2)
                .all(|w| w[0].total_refugees >= w[1].total_refugees)
        );
        assert_eq!(stats.top_origins[0].country, "Syria");
        assert_eq!(stats.top_origins[0].iso_code.as_deref(), Some("SYR"));
    }

    #[tokio::test]
    async fn non_numeric_or_missing_counts_never_fail() {
        let store = InMemoryStore::new(vec![
            doc! { "Country of Origin": "Chad", "Year": 2020, "Refugees": "unknown" },
            doc! { "Country of Origin": "Chad", "Year": 2020 },
            doc! { "Country of Origin": "Chad", "Year": 2020, "Refugees": "5" },
        ]);
        let stats = store.stats(None).await.unwrap();
        assert_eq!(stats.by_year[0].total_refugees, 5);
        assert_eq!(stats.top_origins[0].total_refugees, 5);
        assert_eq!(stats.top_origins[0].iso_code, None);
    }

    #[tokio::test]
    async fn equal_totals_break_ties_by_name() {
        let store = InMemoryStore::new(vec![
            doc! { "Country of Origin": "Sudan", "Year": 2020, "Refugees": "500" },
            doc! { "Country of Origin": "Chad", "Year": 2020, "Refugees": "300" },
            doc! { "Country of Origin": "Chad", "Year": Bson::Null, "Refugees": "200" },
            doc! { "Country of Origin": "Benin", "Year": 2021, "Refugees": "500" },
            doc! { "Country of Origin": "Niger", "Refugees": "900" },
        ]);
        let stats = store.stats(None).await.unwrap();

        let order: Vec<(&str, i64)> = stats
            .top_origins
            .iter()
            .map(|o| (o.country.as_str(), o.total_refugees))
            .collect();
        assert_eq!(
            order,
            vec![("Niger", 900), ("Benin", 500), ("Chad", 500), ("Sudan", 500)]
        );

        // Null and missing years stay out of the yearly totals.
        assert_eq!(
            stats.by_year,
            vec![
                YearTotals { year: 2020, total_refugees: 800, total_asylum: 0 },
                YearTotals { year: 2021, total_refugees: 500, total_asylum: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn huge_counts_saturate_instead_of_overflowing() {
        let big = i64::MAX.to_string();
        let store = InMemoryStore::new(vec![
            doc! { "Country of Origin": "Syria", "Year": 2020, "Refugees": big.as_str() },
            doc! { "Country of Origin": "Syria", "Year": 2020, "Refugees": big.as_str() },
        ]);
        let stats = store.stats(None).await.unwrap();
        assert_eq!(stats.by_year[0].total_refugees, i64::MAX);
        assert_eq!(stats.top_origins[0].total_refugees, i64::MAX);
    }

    #[tokio::test]
    async fn fractional_years_are_not_grouped_or_bounded() {
        let store = InMemoryStore::new(vec![
            doc! { "Country of Origin": "Syria", "Year": 2019, "Refugees": "10" },
            doc! { "Country of Origin": "Syria", "Year": 2019.5, "Refugees": "7" },
            doc! { "Country of Origin": "Syria", "Year": 2020.0, "Refugees": "3" },
        ]);
        let stats = store.stats(None).await.unwrap();
        let years: Vec<(i32, i64)> = stats
            .by_year
            .iter()
            .map(|t| (t.year, t.total_refugees))
            .collect();
        assert_eq!(years, vec![(2019, 10), (2020, 3)]);
        assert_eq!(stats.top_origins[0].total_refugees, 20);
        assert_eq!(
            store.year_bounds().await.unwrap(),
            Some(YearBounds { min: 2019, max: 2020 })
        );
    }

    #[tokio::test]
    async fn raw_respects_country_and_year_range() {
        let store = sample();
        let f = MigrationFilter::all()
            .with_countries(["Syria"])
            .with_years(2018, 2020);
        let rows = store.raw(Some(&f)).await.unwrap();
        assert_eq!(rows.len(), 3);
        for r in &rows {
            assert_eq!(r.country_of_origin, "Syria");
            let y = r.year.unwrap();
            assert!((2018..=2020).contains(&y));
        }
    }

    #[tokio::test]
    async fn raw_is_idempotent_in_insertion_order() {
        let store = sample();
        let f = MigrationFilter::all().with_countries(["Syria"]);
        let first = store.raw(Some(&f)).await.unwrap();
        let second = store.raw(Some(&f)).await.unwrap();
        assert_eq!(first, second);
        let years: Vec<Option<i32>> = first.iter().map(|r| r.year).collect();
        assert_eq!(
            years,
            vec![Some(2019), Some(2017), Some(2021), Some(2018), Some(2020)]
        );
    }

    #[tokio::test]
    async fn filtered_stats_only_see_matching_rows() {
        let f = MigrationFilter::all().with_years(2021, 2021);
        let stats = sample().stats(Some(&f)).await.unwrap();
        assert_eq!(stats.by_year.len(), 1);
        assert_eq!(stats.top_origins.len(), 1);
    }

    #[tokio::test]
    async fn distinct_countries_and_bounds_come_from_live_data() {
        let store = sample();
        let countries = store.distinct_countries().await.unwrap();
        assert_eq!(countries.first().map(String::as_str), Some("Afghanistan"));
        assert_eq!(countries.len(), 7);

        let bounds = store.year_bounds().await.unwrap();
        assert_eq!(bounds, Some(YearBounds { min: 2017, max: 2021 }));
    }

    #[tokio::test]
    async fn empty_store_has_no_bounds() {
        let store = InMemoryStore::default();
        assert_eq!(store.year_bounds().await.unwrap(), None);
        assert!(store.distinct_countries().await.unwrap().is_empty());
        assert_eq!(store.stats(None).await.unwrap(), StatsBundle::default());
    }
}
