//! Deduplicator.
//!
//! Listings are grouped by a cleaned title key. The first listing seen for a key
//! holds its slot in the output; it is swapped out only when it has no price and
//! a later duplicate does.
//!
//! Same-titled listings at different venues or dates collapse into one. Only
//! travel deals are told apart by date.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::record::{Performance, GENRE_TRAVEL};
use crate::TARGET_PIPELINE;

lazy_static! {
    static ref KEY_NOISE: Regex = Regex::new(r"[\s()\[\]\-_!~.,]").unwrap();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub input: usize,
    pub output: usize,
    /// Duplicates folded into an earlier key.
    pub collapsed: usize,
    /// Times an unpriced listing was replaced by a priced duplicate.
    pub price_upgrades: usize,
}

/// Title with whitespace and `()[]-_!~.,` removed, lowercased.
pub fn normalize_title(title: &str) -> String {
    KEY_NOISE.replace_all(title, "").to_lowercase()
}

pub fn dedup_key(performance: &Performance) -> String {
    let key = normalize_title(&performance.title);
    if performance.genre == GENRE_TRAVEL {
        format!("{}_{}", key, performance.date)
    } else {
        key
    }
}

pub fn dedupe(catalog: Vec<Performance>) -> Vec<Performance> {
    dedupe_with_stats(catalog).0
}

pub fn dedupe_with_stats(catalog: Vec<Performance>) -> (Vec<Performance>, DedupStats) {
    let mut stats = DedupStats {
        input: catalog.len(),
        ..Default::default()
    };
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut retained: Vec<Performance> = Vec::new();

    for performance in catalog {
        let key = dedup_key(&performance);
        match slots.get(&key) {
            None => {
                slots.insert(key, retained.len());
                retained.push(performance);
            }
            Some(&slot) => {
                stats.collapsed += 1;
                let current = &mut retained[slot];
                if !current.has_price() && performance.has_price() {
                    debug!(
                        target: TARGET_PIPELINE,
                        "Key '{}': replacing {} with priced duplicate {}", key, current.id, performance.id
                    );
                    *current = performance;
                    stats.price_upgrades += 1;
                } else {
                    debug!(
                        target: TARGET_PIPELINE,
                        "Key '{}': keeping {} over duplicate {}", key, current.id, performance.id
                    );
                }
            }
        }
    }

    stats.output = retained.len();
    info!(
        target: TARGET_PIPELINE,
        "Dedup kept {}/{} ({} collapsed, {} price upgrades)",
        stats.output,
        stats.input,
        stats.collapsed,
        stats.price_upgrades
    );

    (retained, stats)
}
