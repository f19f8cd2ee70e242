//! Filter Engine.
//!
//! Keeps movie and travel listings unconditionally. Every other listing must be
//! active, in an allowed region, and at a real venue that is not blocklisted.
//! Checks run in that order and the first failing check is the rejection
//! reason.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::dates::{evaluate, DateVerdict};
use crate::record::Performance;
use crate::TARGET_FILTER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Carries `Missing` or `Expired`.
    Inactive(DateVerdict),
    RegionNotAllowed,
    PlaceholderVenue,
    BlockedVenue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Genre bypasses all checks.
    Exempt,
    Keep(DateVerdict),
    Reject(RejectReason),
}

/// Per-reason counters for one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub examined: usize,
    pub kept: usize,
    pub exempt: usize,
    pub inactive: usize,
    /// Subset of `inactive` dropped because the date was empty.
    pub missing_dates: usize,
    /// Kept listings whose date could not be read.
    pub unparseable_dates: usize,
    pub region_not_allowed: usize,
    pub placeholder_venue: usize,
    pub blocked_venue: usize,
}

impl FilterStats {
    fn record(&mut self, decision: Decision) {
        self.examined += 1;
        match decision {
            Decision::Exempt => {
                self.kept += 1;
                self.exempt += 1;
            }
            Decision::Keep(verdict) => {
                self.kept += 1;
                if verdict == DateVerdict::Unparseable {
                    self.unparseable_dates += 1;
                }
            }
            Decision::Reject(RejectReason::Inactive(verdict)) => {
                self.inactive += 1;
                if verdict == DateVerdict::Missing {
                    self.missing_dates += 1;
                }
            }
            Decision::Reject(RejectReason::RegionNotAllowed) => self.region_not_allowed += 1,
            Decision::Reject(RejectReason::PlaceholderVenue) => self.placeholder_venue += 1,
            Decision::Reject(RejectReason::BlockedVenue) => self.blocked_venue += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.examined - self.kept
    }
}

pub struct FilterEngine {
    config: FilterConfig,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FilterEngine {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Decide whether one listing stays in the catalog.
    pub fn decide(&self, performance: &Performance, reference: NaiveDateTime) -> Decision {
        if performance.is_lifecycle_exempt(&self.config.exempt_genres) {
            return Decision::Exempt;
        }

        let verdict = evaluate(&performance.date, reference);
        if !verdict.is_active() {
            return Decision::Reject(RejectReason::Inactive(verdict));
        }

        if !self
            .config
            .allowed_regions
            .iter()
            .any(|region| region == &performance.region)
        {
            return Decision::Reject(RejectReason::RegionNotAllowed);
        }

        if performance.venue == self.config.ticket_placeholder {
            return Decision::Reject(RejectReason::PlaceholderVenue);
        }

        if self.is_blocked_venue(&performance.venue) {
            return Decision::Reject(RejectReason::BlockedVenue);
        }

        Decision::Keep(verdict)
    }

    fn is_blocked_venue(&self, venue: &str) -> bool {
        self.config
            .venue_blocklist
            .iter()
            .filter(|blocked| !blocked.is_empty())
            .any(|blocked| venue.contains(blocked.as_str()))
    }

    /// Order-preserving filter pass.
    pub fn filter(&self, catalog: Vec<Performance>, reference: NaiveDateTime) -> Vec<Performance> {
        self.filter_with_stats(catalog, reference).0
    }

    /// Order-preserving filter pass that also reports why listings were dropped.
    pub fn filter_with_stats(
        &self,
        catalog: Vec<Performance>,
        reference: NaiveDateTime,
    ) -> (Vec<Performance>, FilterStats) {
        let mut stats = FilterStats::default();
        let mut kept = Vec::with_capacity(catalog.len());

        for performance in catalog {
            let decision = self.decide(&performance, reference);
            stats.record(decision);

            match decision {
                Decision::Reject(reason) => {
                    debug!(
                        target: TARGET_FILTER,
                        "Dropping {} '{}' ({:?}): date='{}' region='{}' venue='{}'",
                        performance.id,
                        performance.title,
                        reason,
                        performance.date,
                        performance.region,
                        performance.venue
                    );
                }
                Decision::Keep(DateVerdict::Unparseable) => {
                    debug!(
                        target: TARGET_FILTER,
                        "Keeping {} '{}' with unreadable date '{}'",
                        performance.id,
                        performance.title,
                        performance.date
                    );
                    kept.push(performance);
                }
                _ => kept.push(performance),
            }
        }

        info!(
            target: TARGET_FILTER,
            "Filter kept {}/{} (exempt {}, inactive {} of which {} undated, region {}, placeholder venue {}, blocked venue {}, unreadable dates kept {})",
            stats.kept,
            stats.examined,
            stats.exempt,
            stats.inactive,
            stats.missing_dates,
            stats.region_not_allowed,
            stats.placeholder_venue,
            stats.blocked_venue,
            stats.unparseable_dates
        );

        (kept, stats)
    }
}
