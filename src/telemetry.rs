// src/telemetry.rs
use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "steam_review_notifier=info,warn";

/// One-time metrics registration (so series show up in the exposition).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("review_feed_pages_total", "Feed pages fetched, by mode.");
        describe_counter!("reviews_fetched_total", "Reviews read from the feed, by mode.");
        describe_counter!(
            "reviews_admitted_total",
            "Reviews that produced a notification, by mode."
        );
        describe_counter!(
            "reviews_skipped_total",
            "Reviews skipped, by mode and reason (stale | mode)."
        );
        describe_counter!(
            "webhook_delivery_failures_total",
            "Notifications the webhook did not accept."
        );
        describe_counter!("review_runs_total", "Scheduled runs started.");
        describe_counter!("review_run_errors_total", "Scheduled runs that failed.");
        describe_histogram!("review_feed_fetch_ms", "Feed page fetch time in milliseconds.");
        describe_gauge!("review_watermark", "Watermark after the last run (unix seconds).");
        describe_gauge!("review_run_last_ts", "Unix ts when the last run finished.");
    });
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `LOG_FORMAT=json` switches to one JSON object per line.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and register metric descriptions.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Prometheus exposition text of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
