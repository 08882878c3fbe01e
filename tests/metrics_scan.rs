// tests/metrics_scan.rs
#![cfg(feature = "strict-metrics")]
use steam_review_notifier::feed::{FixtureFeed, START_CURSOR};
use steam_review_notifier::notify::RecordingSink;
use steam_review_notifier::review::{FilterMode, Page, Review};
use steam_review_notifier::scan::IncrementalScanner;
use steam_review_notifier::telemetry::Metrics;

#[tokio::test]
async fn metrics_exposed_after_scan() {
    let metrics = Metrics::init().expect("recorder");

    let feed = FixtureFeed::new().with_page(
        FilterMode::Recent,
        START_CURSOR,
        Page {
            reviews: vec![Review {
                author_id: "1".into(),
                language: "english".into(),
                voted_up: true,
                text: "ok".into(),
                created_at: 20,
                updated_at: 20,
            }],
            cursor: String::new(),
        },
    );
    let sink = RecordingSink::failing();
    IncrementalScanner::new(&feed, &sink, "440")
        .scan(FilterMode::Recent, 10)
        .await
        .unwrap();

    let out = metrics.render();
    assert!(out.contains("review_feed_pages_total"));
    assert!(out.contains("reviews_fetched_total"));
    assert!(out.contains("reviews_admitted_total"));
    assert!(out.contains("webhook_delivery_failures_total"));
}
