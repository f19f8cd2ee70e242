//! Pipeline Driver: normalize, concatenate, filter, deduplicate.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::aggregate::{aggregate, SourceBatch, SourceCount};
use crate::dedup::{dedupe_with_stats, DedupStats};
use crate::filter::{FilterEngine, FilterStats};
use crate::record::Catalog;
use crate::TARGET_PIPELINE;

#[cfg(test)]
mod tests;

/// Counters from one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub sources: Vec<SourceCount>,
    pub normalized: usize,
    pub filter: FilterStats,
    pub dedup: DedupStats,
    pub catalog_size: usize,
}

/// Build the catalog from every source's records.
///
/// `batches` must be in priority order: when duplicates carry the same pricing
/// information, the listing from the earlier source is the one kept. A source
/// that failed should be passed as an empty batch. An empty catalog is a valid
/// result.
pub fn run(
    batches: Vec<SourceBatch>,
    reference: NaiveDateTime,
    engine: &FilterEngine,
) -> (Catalog, PipelineReport) {
    let (performances, sources) = aggregate(batches);
    let normalized = performances.len();
    info!(target: TARGET_PIPELINE, "Aggregated {} listings from {} sources", normalized, sources.len());

    let (filtered, filter) = engine.filter_with_stats(performances, reference);
    let (deduped, dedup) = dedupe_with_stats(filtered);

    let catalog = Catalog::new(deduped);
    let report = PipelineReport {
        sources,
        normalized,
        filter,
        dedup,
        catalog_size: catalog.len(),
    };

    info!(target: TARGET_PIPELINE, "Catalog built with {} listings", report.catalog_size);
    (catalog, report)
}

/// Write the catalog as pretty-printed JSON, creating parent directories.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?;
    fs::write(path, json).with_context(|| format!("Failed to write catalog {}", path.display()))?;

    info!(target: TARGET_PIPELINE, "Wrote {} listings to {}", catalog.len(), path.display());
    Ok(())
}

pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let json_data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    serde_json::from_str(&json_data)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))
}
