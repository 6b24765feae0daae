//! Sync pipeline integration tests against an in-memory Strava source.
//!
//! Run with: `cargo test --test sync_pipeline`

mod common;

use activity_map::strava::types::ApiPhoto;
use activity_map::sync::fetch_summaries;
use activity_map::{load_activities, run_sync, ActivityMapError, SyncConfig};
use common::{encode, summary, summary_json, FakeSource, LONDON, MELBOURNE, SYDNEY};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;

fn config(dir: &TempDir) -> SyncConfig {
    SyncConfig {
        output: dir.path().join("src/data/strava-activities.json"),
        pause: Duration::ZERO,
        ..SyncConfig::default()
    }
}

fn photo(value: Value) -> ApiPhoto {
    serde_json::from_value(value).unwrap()
}

/// Two activities in Australia, one abroad, one without a route.
fn mixed_source() -> FakeSource {
    let mut source = FakeSource::default();
    source.pages = vec![vec![
        summary(4, "2024-03-04T07:00:00Z", Some(&[SYDNEY, MELBOURNE]), 2),
        summary(3, "2024-03-03T07:00:00Z", Some(&[LONDON, SYDNEY]), 0),
        summary(2, "2024-03-02T07:00:00Z", None, 0),
        summary(1, "2024-03-01T07:00:00Z", Some(&[MELBOURNE]), 0),
    ]];

    // Detail for 4 carries a description and a denser polyline
    let mut detail = summary_json(4, "2024-03-04T07:00:00Z", Some(&[SYDNEY, MELBOURNE]), 2);
    detail["description"] = json!("Down the Hume");
    detail["map"]["polyline"] = json!(encode(&[SYDNEY, [-35.28, 149.13], MELBOURNE]));
    source
        .details
        .insert(4, serde_json::from_value(detail).unwrap());

    source.photos.insert(
        4,
        vec![
            photo(json!({
                "urls": { "1000": "https://x/4a.jpg" },
                "location": [-35.28, 149.13],
                "created_at": "2024-03-04T12:00:00Z",
                "caption": "Canberra"
            })),
            photo(json!({ "urls": { "100": "https://x/4b-100.jpg", "600": "https://x/4b-600.jpg" } })),
            photo(json!({ "urls": null })),
        ],
    );
    source.failing_details.push(1);
    source
}

#[tokio::test]
async fn test_sync_filters_enriches_and_writes() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let source = mixed_source();

    let report = run_sync(&source, &config).await.unwrap();
    assert_eq!(report.fetched, 4);
    assert_eq!(report.in_bounds, 2);
    assert_eq!(report.enriched, 1);
    assert_eq!(report.degraded, 1);
    assert_eq!(report.photos, 2);

    assert_eq!(
        source.calls(),
        vec![
            "list page=1 per_page=100",
            "detail 4",
            "photos 4 size=1000",
            "detail 1",
        ]
    );

    let written = load_activities(&config.output).unwrap();
    let ids: Vec<u64> = written.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![4, 1]);

    let detailed = &written[0];
    assert_eq!(detailed.description(), Some("Down the Hume"));
    assert_eq!(detailed.coordinates().len(), 3);
    let photos = detailed.photos();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].url, "https://x/4a.jpg");
    assert_eq!(photos[0].caption.as_deref(), Some("Canberra"));
    assert_eq!(photos[0].timestamp.as_deref(), Some("2024-03-04T12:00:00Z"));
    assert_eq!(photos[1].url, "https://x/4b-600.jpg");

    // The degraded record is the summary, with its decoded route
    let degraded = &written[1];
    assert!(degraded.description().is_none());
    assert!(degraded.photos.is_none());
    assert_eq!(degraded.coordinates().len(), 1);
    assert!((degraded.coordinates()[0][0] - MELBOURNE[0]).abs() < 1e-5);
}

#[tokio::test]
async fn test_sync_preserves_api_fields() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    run_sync(&mixed_source(), &config).await.unwrap();

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output).unwrap()).unwrap();
    assert_eq!(raw[0]["kudos_count"], 4);
    assert_eq!(raw[0]["map"]["id"], "a4");
    assert_eq!(raw[1]["type"], "Ride");
    assert!(raw[0]["coordinates"].is_array());
}

#[tokio::test]
async fn test_detail_without_polyline_reuses_summary_route() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut source = FakeSource::default();
    source.pages = vec![vec![summary(
        9,
        "2024-05-01T07:00:00Z",
        Some(&[SYDNEY, MELBOURNE]),
        0,
    )]];
    source
        .details
        .insert(9, summary(9, "2024-05-01T07:00:00Z", None, 0));

    run_sync(&source, &config).await.unwrap();
    let written = load_activities(&config.output).unwrap();
    assert_eq!(written[0].coordinates().len(), 2);
    // No photos requested without a photo count
    assert_eq!(source.calls(), vec!["list page=1 per_page=100", "detail 9"]);
}

#[tokio::test]
async fn test_photo_failure_keeps_detail() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let mut source = FakeSource::default();
    source.pages = vec![vec![summary(5, "2024-05-01T07:00:00Z", Some(&[SYDNEY]), 3)]];
    let mut detail = summary_json(5, "2024-05-01T07:00:00Z", Some(&[SYDNEY]), 3);
    detail["description"] = json!("Ferry day");
    source
        .details
        .insert(5, serde_json::from_value(detail).unwrap());
    source.failing_photos.push(5);

    let report = run_sync(&source, &config).await.unwrap();
    assert_eq!(report.enriched, 1);
    assert_eq!(report.photos, 0);

    let written = load_activities(&config.output).unwrap();
    assert_eq!(written[0].description(), Some("Ferry day"));
    assert!(written[0].photos.is_none());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let source = FakeSource {
        fail_listing: true,
        ..FakeSource::default()
    };

    let err = run_sync(&source, &config).await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert!(!config.output.exists());
}

#[tokio::test]
async fn test_empty_result_writes_empty_array() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let report = run_sync(&FakeSource::default(), &config).await.unwrap();
    assert_eq!(report.fetched, 0);
    assert_eq!(std::fs::read_to_string(&config.output).unwrap(), "[]");
}

#[tokio::test]
async fn test_pagination_stops_on_short_page() {
    let mut source = FakeSource::default();
    source.pages = vec![
        vec![
            summary(5, "2024-01-05T07:00:00Z", Some(&[SYDNEY]), 0),
            summary(4, "2024-01-04T07:00:00Z", Some(&[SYDNEY]), 0),
        ],
        vec![
            summary(3, "2024-01-03T07:00:00Z", Some(&[SYDNEY]), 0),
            summary(2, "2024-01-02T07:00:00Z", Some(&[SYDNEY]), 0),
        ],
        vec![summary(1, "2024-01-01T07:00:00Z", Some(&[SYDNEY]), 0)],
    ];

    let all = fetch_summaries(&source, 2, 10).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(source.calls().len(), 3);

    let limited = fetch_summaries(&source, 2, 2).await.unwrap();
    let ids: Vec<u64> = limited.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![5, 4, 3, 2]);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_fetching() {
    let dir = TempDir::new().unwrap();
    let config = SyncConfig {
        max_pages: 0,
        ..config(&dir)
    };
    let source = FakeSource::default();
    let err = run_sync(&source, &config).await.unwrap_err();
    assert!(matches!(err, ActivityMapError::Config { .. }));
    assert!(source.calls().is_empty());
}
