//! Concatenation of per-source batches into one collection.

use serde::Serialize;
use tracing::debug;

use crate::normalize::normalize_all;
use crate::record::{Performance, RawRecord};
use crate::TARGET_PIPELINE;

/// All records one upstream source produced in a single run.
///
/// Batches are always handled as an ordered list. Earlier sources win
/// deduplication ties, so the order doubles as the source priority policy.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub name: String,
    pub records: Vec<RawRecord>,
}

impl SourceBatch {
    pub fn new(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// A source that failed or produced nothing.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// How many records each source contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub name: String,
    pub records: usize,
}

/// Normalize every batch and concatenate them in batch order.
pub fn aggregate(batches: Vec<SourceBatch>) -> (Vec<Performance>, Vec<SourceCount>) {
    let mut performances = Vec::new();
    let mut counts = Vec::with_capacity(batches.len());

    for batch in batches {
        debug!(target: TARGET_PIPELINE, "Normalizing {} records from {}", batch.records.len(), batch.name);
        counts.push(SourceCount {
            name: batch.name,
            records: batch.records.len(),
        });
        performances.extend(normalize_all(batch.records));
    }

    (performances, counts)
}
