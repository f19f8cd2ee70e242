use chrono::NaiveDateTime;
use serde_json::{json, Value};
use std::env;
use std::fs;

use super::{read_catalog, run, write_catalog};
use crate::aggregate::SourceBatch;
use crate::config::DEFAULT_TICKET_PLACEHOLDER;
use crate::filter::FilterEngine;
use crate::record::RawRecord;

fn reference() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-06-15T00:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn raw(value: Value) -> RawRecord {
    serde_json::from_value(value).unwrap()
}

fn concert(id: Value, title: &str, venue: &str) -> RawRecord {
    raw(json!({
        "id": id,
        "title": title,
        "image": "https://img.example/poster.jpg",
        "date": "2025.06.01 ~ 2025.06.30",
        "venue": venue,
        "link": "https://tickets.example/show",
        "region": "seoul",
        "genre": "concert",
    }))
}

#[test]
fn test_placeholder_venue_dropped_while_real_venue_passes() {
    let batches = vec![
        SourceBatch::new(
            "ticket_a",
            vec![concert(json!(101), "Spring Jazz Night", DEFAULT_TICKET_PLACEHOLDER)],
        ),
        SourceBatch::new(
            "ticket_b",
            vec![concert(json!("b-7"), "Spring Jazz Night", "Blue Square Hall")],
        ),
        SourceBatch::new(
            "movies",
            vec![raw(json!({"id": 9, "title": "Film", "genre": "movie", "date": ""}))],
        ),
    ];

    let (catalog, report) = run(batches, reference(), &FilterEngine::default());

    let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["b-7", "9"]);
    assert!(catalog.iter().all(|p| p.venue != DEFAULT_TICKET_PLACEHOLDER));
    assert_eq!(report.filter.placeholder_venue, 1);
    assert_eq!(report.normalized, 3);
    assert_eq!(report.catalog_size, 2);
}

#[test]
fn test_source_order_decides_unpriced_duplicates() {
    let first = SourceBatch::new("first", vec![concert(json!(1), "Show (2025)", "Hall One")]);
    let second = SourceBatch::new("second", vec![concert(json!(2), "show2025", "Hall Two")]);

    let (catalog, _) = run(vec![first.clone(), second.clone()], reference(), &FilterEngine::default());
    assert_eq!(catalog.as_slice()[0].id, "1");

    let (catalog, _) = run(vec![second, first], reference(), &FilterEngine::default());
    assert_eq!(catalog.as_slice()[0].id, "2");
}

#[test]
fn test_priced_listing_from_later_source_wins() {
    let mut priced = concert(json!(2), "show2025", "Hall Two");
    priced.price = Some(json!("50000"));

    let batches = vec![
        SourceBatch::new("first", vec![concert(json!(1), "Show (2025)", "Hall One")]),
        SourceBatch::new("other", vec![concert(json!(5), "Different Show", "Hall Five")]),
        SourceBatch::new("second", vec![priced]),
    ];

    let (catalog, report) = run(batches, reference(), &FilterEngine::default());
    let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "5"]);
    assert_eq!(catalog.as_slice()[0].price.as_deref(), Some("50000"));
    assert_eq!(report.dedup.price_upgrades, 1);
}

#[test]
fn test_failed_sources_contribute_nothing() {
    let batches = vec![
        SourceBatch::empty("down"),
        SourceBatch::new("up", vec![concert(json!(3), "Matinee", "Hall Three")]),
        SourceBatch::empty("also_down"),
    ];

    let (catalog, report) = run(batches, reference(), &FilterEngine::default());
    assert_eq!(catalog.len(), 1);
    assert_eq!(report.sources.len(), 3);
    assert_eq!(report.sources[0].records, 0);
}

#[test]
fn test_no_sources_yield_empty_catalog() {
    let (catalog, report) = run(Vec::new(), reference(), &FilterEngine::default());
    assert!(catalog.is_empty());
    assert_eq!(report.catalog_size, 0);
}

#[test]
fn test_catalog_round_trips_through_disk() {
    let dir = env::temp_dir().join(format!("marquee-pipeline-{}", std::process::id()));
    let path = dir.join("out").join("performances.json");

    let batches = vec![SourceBatch::new(
        "ticket",
        vec![concert(json!(11), "Encore", "Hall Eleven")],
    )];
    let (catalog, _) = run(batches, reference(), &FilterEngine::default());

    write_catalog(&path, &catalog).unwrap();
    let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(written.is_array());
    assert_eq!(written[0]["id"], json!("11"));

    assert_eq!(read_catalog(&path).unwrap(), catalog);
    fs::remove_dir_all(&dir).ok();
}
