//! Boundary to the per-source scrapers.
//!
//! Each scraper is a [`SourceProvider`]. Providers run concurrently, each under
//! its own timeout, and a provider that fails or times out contributes an empty
//! batch. Results always come back in provider order, never completion order,
//! because that order is the deduplication priority.

use anyhow::{anyhow, Context, Result};
use futures::future::{join_all, BoxFuture};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::aggregate::SourceBatch;
use crate::record::RawRecord;
use crate::TARGET_SOURCE;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

pub trait SourceProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawRecord>>>;
}

/// Reads one scraper's output: a JSON array of listing objects.
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceProvider for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawRecord>>> {
        Box::pin(async move {
            let body = tokio::fs::read_to_string(&self.path)
                .await
                .with_context(|| format!("Failed to read {}", self.path.display()))?;
            parse_records(&body, &self.name)
        })
    }
}

/// Parse a scraper dump. Entries that are not objects are skipped with a warning
/// rather than failing the whole source.
pub fn parse_records(body: &str, source: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(body)
        .with_context(|| format!("Source {} is not valid JSON", source))?;

    let Value::Array(entries) = value else {
        return Err(anyhow!("Source {} must contain a JSON array", source));
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(entry) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(target: TARGET_SOURCE, "Skipping entry {} from {}: {}", index, source, err);
            }
        }
    }

    Ok(records)
}

/// Run every provider concurrently and wait for all of them.
pub async fn collect_sources(
    providers: &[Box<dyn SourceProvider>],
    per_source_timeout: Duration,
) -> Vec<SourceBatch> {
    let fetches = providers.iter().map(|provider| async move {
        let name = provider.name().to_string();
        debug!(target: TARGET_SOURCE, "Loading source {}", name);

        match timeout(per_source_timeout, provider.fetch()).await {
            Ok(Ok(records)) => {
                if records.is_empty() {
                    warn!(target: TARGET_SOURCE, "Source {} returned no records", name);
                } else {
                    info!(target: TARGET_SOURCE, "Loaded {} records from {}", records.len(), name);
                }
                SourceBatch::new(name, records)
            }
            Ok(Err(err)) => {
                error!(target: TARGET_SOURCE, "Source {} failed: {:#}", name, err);
                SourceBatch::empty(name)
            }
            Err(_) => {
                error!(
                    target: TARGET_SOURCE,
                    "Source {} timed out after {} seconds",
                    name,
                    per_source_timeout.as_secs()
                );
                SourceBatch::empty(name)
            }
        }
    });

    join_all(fetches).await
}

/// Build file providers for `<dir>/<name>.json`.
///
/// Names listed in `priority` come first, in that order, even if their file is
/// missing (they then load as failed sources). Remaining files follow in
/// alphabetical order.
pub fn discover_json_sources(dir: &Path, priority: &[String]) -> Result<Vec<Box<dyn SourceProvider>>> {
    let mut found = BTreeSet::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read sources directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.insert(stem.to_string());
        }
    }

    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();
    let mut seen = BTreeSet::new();

    for name in priority.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.insert(name.to_string()) {
            continue;
        }
        if !found.contains(name) {
            warn!(target: TARGET_SOURCE, "Prioritized source {} has no file in {}", name, dir.display());
        }
        providers.push(Box::new(JsonFileSource::new(name, dir.join(format!("{}.json", name)))));
    }

    for name in found {
        if seen.insert(name.clone()) {
            let path = dir.join(format!("{}.json", name));
            providers.push(Box::new(JsonFileSource::new(name, path)));
        }
    }

    Ok(providers)
}
