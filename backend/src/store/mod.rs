//! Persistence of normalized site records.
//!
//! The pipeline only ever sees the [`SiteStore`] trait: one call per batch,
//! succeeding or failing as a unit. No guarantee is assumed across batches.

mod sqlite;

pub use sqlite::SqliteSiteStore;

use crate::error::StoreError;
use common::model::site::SiteRecord;

/// The insert-batch capability of the backing datastore.
pub trait SiteStore {
    /// Persists every record of `batch` or none of them.
    fn insert_batch(&mut self, batch: &[SiteRecord]) -> Result<(), StoreError>;
}
