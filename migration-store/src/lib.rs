//! Read-only data access over the migration statistics collection.
//!
//! This crate provides:
//! - [`MigrationStore`]: the interface the rest of the workspace depends on
//! - [`MongoMigrationStore`]: MongoDB-backed implementation (aggregation pipelines)
//! - [`InMemoryStore`]: the same semantics over a `Vec` of documents
//!
//! Counts are stored as text and coerced at query time; see [`coerce_count`].

mod config;
mod errors;
mod memory;
mod mongo_facade;
pub mod pipelines;
mod record;

pub use config::{DEFAULT_COLLECTION, StoreConfig};
pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use mongo_facade::MongoMigrationStore;
pub use record::{
    FIELD_ASYLUM, FIELD_COUNTRY, FIELD_ISO, FIELD_REFUGEES, FIELD_YEAR, MigrationFilter,
    MigrationRecord, OriginTotals, StatsBundle, YearBounds, YearRange, YearTotals, coerce_count,
};

/// Re-export so callers can build documents without depending on `mongodb` directly.
pub use mongodb::bson;

use std::{future::Future, pin::Pin};

/// Boxed future returned by [`MigrationStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Read operations over the record collection.
///
/// Implementations are shared behind `Arc<dyn MigrationStore>` and must be
/// safe to call sequentially from any task. No retries are performed.
pub trait MigrationStore: Send + Sync {
    /// By-year totals and the top origin countries for the matching records.
    /// `None` means all records.
    fn stats<'a>(&'a self, filter: Option<&'a MigrationFilter>) -> StoreFuture<'a, StatsBundle>;

    /// All matching records without internal ids, in natural (insertion) order.
    fn raw<'a>(
        &'a self,
        filter: Option<&'a MigrationFilter>,
    ) -> StoreFuture<'a, Vec<MigrationRecord>>;

    /// Distinct origin countries, sorted.
    fn distinct_countries(&self) -> StoreFuture<'_, Vec<String>>;

    /// Min/max year over records with a numeric year; `None` if there are none.
    fn year_bounds(&self) -> StoreFuture<'_, Option<YearBounds>>;

    /// Cheap connectivity check.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
