use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row as PrettyRow, Table};
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use tracing::{info, warn};

use marquee::config::FilterConfig;
use marquee::dates::{classify, evaluate, parse_reference, target_instant};
use marquee::filter::FilterEngine;
use marquee::pipeline::{read_catalog, run, write_catalog, PipelineReport};
use marquee::sources::{collect_sources, discover_json_sources};
use marquee::venues::VenueDirectory;
use marquee::TARGET_PIPELINE;

#[derive(Parser)]
#[clap(name = "marquee", about = "Build the performance catalog from scraper output")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every source, filter, deduplicate and write the catalog
    Build {
        /// Directory holding one `<source>.json` file per scraper
        #[clap(long, env = "MARQUEE_SOURCES_DIR", default_value = "data/sources")]
        sources_dir: PathBuf,

        /// Source priority, highest first; unlisted sources follow alphabetically
        #[clap(long, env = "MARQUEE_SOURCE_ORDER", value_delimiter = ',')]
        order: Vec<String>,

        /// Catalog output path
        #[clap(short, long, env = "MARQUEE_CATALOG", default_value = "data/performances.json")]
        out: PathBuf,

        /// Reference instant (defaults to now, local time)
        #[clap(long)]
        now: Option<String>,

        /// JSON filter configuration; environment overrides still apply
        #[clap(short, long, env = "MARQUEE_FILTER_CONFIG")]
        config: Option<PathBuf>,

        /// Seconds to wait for each source
        #[clap(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Show how a date string is classified
    ClassifyDate {
        #[clap(required = true)]
        date: String,

        /// Reference instant (defaults to now, local time)
        #[clap(long)]
        now: Option<String>,
    },

    /// List catalog venues missing from the venue directory
    Venues {
        #[clap(long, env = "MARQUEE_CATALOG", default_value = "data/performances.json")]
        catalog: PathBuf,

        #[clap(long, env = "MARQUEE_VENUES", default_value = "data/venues.json")]
        venues: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    marquee::logging::configure_logging();

    let args = Cli::parse();

    match args.command {
        Commands::Build {
            sources_dir,
            order,
            out,
            now,
            config,
            timeout_secs,
        } => {
            let reference = reference_instant(now.as_deref())?;
            build(
                &sources_dir,
                &order,
                &out,
                reference,
                config.as_deref(),
                Duration::from_secs(timeout_secs),
            )
            .await?;
        }
        Commands::ClassifyDate { date, now } => {
            let reference = reference_instant(now.as_deref())?;
            println!("input:     {:?}", date);
            println!("shape:     {:?}", classify(&date));
            match target_instant(&date) {
                Some(target) => println!("ends at:   {}", target),
                None => println!("ends at:   -"),
            }
            println!("reference: {}", reference);
            println!("verdict:   {:?}", evaluate(&date, reference));
        }
        Commands::Venues { catalog, venues } => {
            report_unknown_venues(&catalog, &venues)?;
        }
    }

    Ok(())
}

/// The only place the wall clock is read.
fn reference_instant(now: Option<&str>) -> Result<NaiveDateTime> {
    match now {
        Some(input) => parse_reference(input),
        None => Ok(Local::now().naive_local()),
    }
}

async fn build(
    sources_dir: &Path,
    order: &[String],
    out: &Path,
    reference: NaiveDateTime,
    config: Option<&Path>,
    per_source_timeout: Duration,
) -> Result<()> {
    let filter_config = match config {
        Some(path) => FilterConfig::from_json_file(path)?.with_env_overrides(),
        None => FilterConfig::from_env(),
    };
    let engine = FilterEngine::new(filter_config);

    info!(target: TARGET_PIPELINE, "Building catalog as of {}", reference);
    let providers = discover_json_sources(sources_dir, order)?;
    if providers.is_empty() {
        warn!(target: TARGET_PIPELINE, "No sources found in {}", sources_dir.display());
    }

    let batches = collect_sources(&providers, per_source_timeout).await;
    let (catalog, report) = run(batches, reference, &engine);

    write_catalog(out, &catalog)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &PipelineReport) {
    let mut sources = Table::new();
    sources.add_row(PrettyRow::new(vec![Cell::new("Source"), Cell::new("Records")]));
    for source in &report.sources {
        sources.add_row(PrettyRow::new(vec![
            Cell::new(&source.name),
            Cell::new(&source.records.to_string()),
        ]));
    }
    sources.printstd();

    let filter = &report.filter;
    let dedup = &report.dedup;
    let mut stages = Table::new();
    stages.add_row(PrettyRow::new(vec![Cell::new("Stage"), Cell::new("Count")]));
    for (label, count) in [
        ("normalized", report.normalized),
        ("kept (movie/travel)", filter.exempt),
        ("dropped: inactive", filter.inactive),
        ("  of which undated", filter.missing_dates),
        ("dropped: region", filter.region_not_allowed),
        ("dropped: placeholder venue", filter.placeholder_venue),
        ("dropped: blocked venue", filter.blocked_venue),
        ("kept with unreadable date", filter.unparseable_dates),
        ("after filter", filter.kept),
        ("duplicates collapsed", dedup.collapsed),
        ("price upgrades", dedup.price_upgrades),
        ("catalog", report.catalog_size),
    ] {
        stages.add_row(PrettyRow::new(vec![
            Cell::new(label),
            Cell::new(&count.to_string()),
        ]));
    }
    stages.printstd();
}

fn report_unknown_venues(catalog_path: &Path, venues_path: &Path) -> Result<()> {
    let catalog = read_catalog(catalog_path)?;
    let directory = VenueDirectory::load(venues_path)?;
    let unknown = directory.unknown_venues(&catalog);

    info!(
        target: TARGET_PIPELINE,
        "{} of the catalog's venues are missing from {} ({} known)",
        unknown.len(),
        venues_path.display(),
        directory.len()
    );
    for venue in unknown {
        println!("{}", venue);
    }
    Ok(())
}
