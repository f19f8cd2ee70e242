//! Aggregates performance listings from independent scrapers into one
//! normalized, filtered and deduplicated catalog.
//!
//! Stages run leaf-first: [`normalize`] each raw record, [`aggregate`] the
//! sources in priority order, [`filter`] by date, region and venue, then
//! [`dedup`] by cleaned title. [`pipeline::run`] drives them in sequence.

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod dedup;
pub mod environment;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod sources;
pub mod venues;

pub use aggregate::SourceBatch;
pub use config::FilterConfig;
pub use filter::FilterEngine;
pub use pipeline::{run, PipelineReport};
pub use record::{Catalog, Performance, RawRecord};

pub const TARGET_SOURCE: &str = "source_load";
pub const TARGET_FILTER: &str = "catalog_filter";
pub const TARGET_PIPELINE: &str = "pipeline";
