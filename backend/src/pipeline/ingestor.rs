//! Submits batches to the store, one after another.
//!
//! Batches are never sent concurrently: progress only moves forward and the
//! store sees at most one insert per upload at a time. The first failing
//! batch stops the run. Nothing is retried or rolled back, so the batches
//! before it stay committed and the ones after it are never attempted.

use crate::error::IngestError;
use crate::store::SiteStore;
use common::model::ingestion::{BatchStatus, IngestSummary, IngestionOutcome};
use common::model::site::SiteRecord;
use log::{error, info};

/// Inserts `batches` in order, reporting an outcome after each one.
pub fn ingest<S, F>(
    batches: &[Vec<SiteRecord>],
    store: &mut S,
    mut on_outcome: F,
) -> Result<IngestSummary, IngestError>
where
    S: SiteStore + ?Sized,
    F: FnMut(&IngestionOutcome),
{
    let total: usize = batches.iter().map(Vec::len).sum();
    let batch_count = batches.len();
    let mut committed = 0;

    for (batch_index, batch) in batches.iter().enumerate() {
        match store.insert_batch(batch) {
            Ok(()) => {
                committed += batch.len();
                on_outcome(&IngestionOutcome {
                    batch_index,
                    batch_count,
                    batch_len: batch.len(),
                    committed,
                    total,
                    status: BatchStatus::Committed,
                });
            }
            Err(source) => {
                error!(
                    "batch {} of {} failed with {} of {} records committed: {}",
                    batch_index + 1,
                    batch_count,
                    committed,
                    total,
                    source
                );
                on_outcome(&IngestionOutcome {
                    batch_index,
                    batch_count,
                    batch_len: batch.len(),
                    committed,
                    total,
                    status: BatchStatus::Failed {
                        error: source.to_string(),
                    },
                });
                return Err(IngestError {
                    batch_index,
                    batch_count,
                    committed,
                    total,
                    source,
                });
            }
        }
    }

    info!("ingested {} records in {} batches", committed, batch_count);
    Ok(IngestSummary {
        committed,
        batches: batch_count,
    })
}
