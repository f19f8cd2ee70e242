//! Venue directory lookups.
//!
//! The rendering layer joins each listing's `venue` against a directory of
//! geocoded venues. This module only reads that directory and reports catalog
//! venues it does not cover yet.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::record::Catalog;
use crate::TARGET_PIPELINE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueDirectory {
    venues: BTreeMap<String, VenueInfo>,
}

impl VenueDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let json_data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read venue directory {}", path.display()))?;
        let directory: VenueDirectory = serde_json::from_str(&json_data)
            .with_context(|| format!("Failed to parse venue directory {}", path.display()))?;
        debug!(target: TARGET_PIPELINE, "Loaded {} venues from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn get(&self, venue: &str) -> Option<&VenueInfo> {
        self.venues.get(venue)
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Catalog venues with no directory entry, first-seen order, no repeats.
    /// Listings without a venue are skipped.
    pub fn unknown_venues(&self, catalog: &Catalog) -> Vec<String> {
        let mut seen = HashSet::new();
        catalog
            .iter()
            .map(|p| p.venue.trim())
            .filter(|venue| !venue.is_empty())
            .filter(|venue| !self.venues.contains_key(*venue))
            .filter(|venue| seen.insert(venue.to_string()))
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<(String, VenueInfo)> for VenueDirectory {
    fn from_iter<I: IntoIterator<Item = (String, VenueInfo)>>(iter: I) -> Self {
        Self {
            venues: iter.into_iter().collect(),
        }
    }
}
