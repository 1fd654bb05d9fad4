//! Thin adapter around the `mongodb` driver to isolate API usage.
//!
//! All driver calls live here; the rest of the workspace only sees
//! [`MigrationStore`].

use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, Document, doc},
    options::{ClientOptions, ServerApi, ServerApiVersion},
};
use tracing::{debug, info};

use crate::{
    MigrationStore, StoreFuture,
    config::StoreConfig,
    errors::StoreError,
    pipelines,
    record::{
        FIELD_COUNTRY, MigrationFilter, MigrationRecord, OriginTotals, StatsBundle, YearBounds,
        YearTotals, coerce_count, numeric_year,
    },
};

/// MongoDB-backed store.
///
/// Construct once at startup and share behind an `Arc`; the driver pools
/// connections internally.
pub struct MongoMigrationStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoMigrationStore {
    /// Parses the connection string and builds a client pinned to Stable API v1.
    ///
    /// The driver connects lazily; the first query (or [`MigrationStore::ping`])
    /// surfaces connectivity problems.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;

        let mut options = ClientOptions::parse(&cfg.uri).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some("migration-chat-backend".to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&cfg.database)
            .collection::<Document>(&cfg.collection);

        info!(
            database = %cfg.database,
            collection = %cfg.collection,
            "MongoMigrationStore initialized"
        );

        Ok(Self {
            client,
            database: cfg.database.clone(),
            collection,
        })
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn load_stats(&self, filter: Option<&MigrationFilter>) -> Result<StatsBundle, StoreError> {
        let by_year = self
            .aggregate(pipelines::by_year_pipeline(filter))
            .await?
            .iter()
            .map(year_totals_from)
            .collect::<Result<Vec<_>, _>>()?;

        let top_origins = self
            .aggregate(pipelines::top_origins_pipeline(filter))
            .await?
            .iter()
            .map(origin_totals_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            collection = %self.collection.name(),
            years = by_year.len(),
            origins = top_origins.len(),
            "stats aggregated"
        );

        Ok(StatsBundle {
            by_year,
            top_origins,
        })
    }

    async fn load_raw(
        &self,
        filter: Option<&MigrationFilter>,
    ) -> Result<Vec<MigrationRecord>, StoreError> {
        let cursor = self
            .collection
            .find(pipelines::filter_document(filter))
            .projection(doc! { "_id": 0 })
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        debug!(
            collection = %self.collection.name(),
            records = docs.len(),
            "raw records fetched"
        );

        Ok(docs.into_iter().map(MigrationRecord::from_document).collect())
    }

    async fn load_countries(&self) -> Result<Vec<String>, StoreError> {
        let values = self.collection.distinct(FIELD_COUNTRY, doc! {}).await?;
        let mut countries: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();
        countries.sort();
        countries.dedup();
        Ok(countries)
    }

    async fn run_ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn load_bounds(&self) -> Result<Option<YearBounds>, StoreError> {
        let docs = self.aggregate(pipelines::year_bounds_pipeline()).await?;
        docs.first().map(year_bounds_from).transpose()
    }
}

impl MigrationStore for MongoMigrationStore {
    fn stats<'a>(&'a self, filter: Option<&'a MigrationFilter>) -> StoreFuture<'a, StatsBundle> {
        Box::pin(self.load_stats(filter))
    }

    fn raw<'a>(
        &'a self,
        filter: Option<&'a MigrationFilter>,
    ) -> StoreFuture<'a, Vec<MigrationRecord>> {
        Box::pin(self.load_raw(filter))
    }

    fn distinct_countries(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(self.load_countries())
    }

    fn year_bounds(&self) -> StoreFuture<'_, Option<YearBounds>> {
        Box::pin(self.load_bounds())
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.run_ping())
    }
}

/* ---------------------- Aggregation output decoding ---------------------- */

fn year_totals_from(doc: &Document) -> Result<YearTotals, StoreError> {
    let year = doc
        .get("_id")
        .and_then(numeric_year)
        .ok_or_else(|| StoreError::Decode(format!("by_year group without numeric _id: {doc}")))?;
    Ok(YearTotals {
        year,
        total_refugees: coerce_count(doc.get("total_refugees")),
        total_asylum: coerce_count(doc.get("total_asylum")),
    })
}

fn origin_totals_from(doc: &Document) -> Result<OriginTotals, StoreError> {
    let country = doc
        .get_str("_id")
        .map_err(|_| StoreError::Decode(format!("top_origins group without country _id: {doc}")))?
        .to_string();
    let iso_code = match doc.get("iso_code") {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    };
    Ok(OriginTotals {
        country,
        total_refugees: coerce_count(doc.get("total_refugees")),
        iso_code,
    })
}

fn year_bounds_from(doc: &Document) -> Result<YearBounds, StoreError> {
    let field = |name: &str| {
        doc.get(name)
            .and_then(numeric_year)
            .ok_or_else(|| StoreError::Decode(format!("year bounds without numeric {name}: {doc}")))
    };
    Ok(YearBounds {
        min: field("min")?,
        max: field("max")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_by_year_group() {
        let t = year_totals_from(&doc! { "_id": 2019, "total_refugees": 10_i64, "total_asylum": 3_i64 })
            .unwrap();
        assert_eq!(
            t,
            YearTotals {
                year: 2019,
                total_refugees: 10,
                total_asylum: 3
            }
        );
    }

    #[test]
    fn null_year_group_is_a_decode_error() {
        let err = year_totals_from(&doc! { "_id": Bson::Null, "total_refugees": 1_i64 });
        assert!(matches!(err, Err(StoreError::Decode(_))));
    }

    #[test]
    fn origin_group_with_null_iso_keeps_none() {
        let o = origin_totals_from(&doc! {
            "_id": "Afghanistan",
            "total_refugees": 2_600_000_i64,
            "iso_code": Bson::Null,
        })
        .unwrap();
        assert_eq!(o.country, "Afghanistan");
        assert_eq!(o.iso_code, None);
    }

    #[test]
    fn decodes_year_bounds() {
        let b = year_bounds_from(&doc! { "_id": Bson::Null, "min": 2000, "max": 2023_i64 }).unwrap();
        assert_eq!(b, YearBounds { min: 2000, max: 2023 });
    }
}
