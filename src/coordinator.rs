// src/coordinator.rs
use metrics::gauge;

use crate::config::AppConfig;
use crate::error::{ConfigError, Result};
use crate::feed::ReviewFeed;
use crate::notify::NotificationSink;
use crate::review::FilterMode;
use crate::scan::{IncrementalScanner, ScanOutcome};
use crate::store::ParameterStore;

/// Leaf name of the watermark parameter under the configured scope.
pub const WATERMARK_PARAM: &str = "timestamp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub previous_watermark: i64,
    pub new_watermark: i64,
    pub scans: Vec<ScanOutcome>,
    /// False when nothing newer than the previous watermark was admitted.
    pub persisted: bool,
}

impl RunReport {
    pub fn admitted(&self) -> u32 {
        self.scans.iter().map(|s| s.admitted).sum()
    }

    pub fn delivery_failures(&self) -> u32 {
        self.scans.iter().map(|s| s.delivery_failures).sum()
    }
}

/// Parse the stored watermark (base-10 integer, surrounding whitespace ignored).
pub fn parse_watermark(raw: &str) -> std::result::Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::WatermarkInvalid {
            value: raw.to_string(),
        })
}

/// One notifier run: read the watermark, scan both orderings, advance the
/// watermark if anything newer was admitted.
///
/// Assumes no two runs execute at once; the trigger (or `scheduler`) must
/// guarantee that. The watermark is written only at the very end, so a run
/// killed midway repeats its window next time (notifications are
/// at-least-once).
pub struct RunCoordinator<'a> {
    config: &'a AppConfig,
    store: &'a dyn ParameterStore,
    feed: &'a dyn ReviewFeed,
    sink: &'a dyn NotificationSink,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(
        config: &'a AppConfig,
        store: &'a dyn ParameterStore,
        feed: &'a dyn ReviewFeed,
        sink: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            config,
            store,
            feed,
            sink,
        }
    }

    pub async fn read_watermark(&self) -> Result<i64> {
        let scope = &self.config.parameter_store_scope;
        let params = self.store.get_parameters_by_path(scope).await?;
        let raw = params
            .get(WATERMARK_PARAM)
            .ok_or_else(|| ConfigError::WatermarkMissing {
                scope: scope.clone(),
            })?;
        Ok(parse_watermark(raw)?)
    }

    pub async fn run(&self) -> Result<RunReport> {
        let watermark = self.read_watermark().await?;
        tracing::info!(
            app_id = %self.config.app_id,
            feed = self.feed.name(),
            watermark,
            "run started"
        );

        let scanner = IncrementalScanner::new(self.feed, self.sink, &self.config.app_id);
        let mut scans = Vec::with_capacity(FilterMode::ALL.len());
        // Both passes start from the same watermark; only their maxima merge.
        for mode in FilterMode::ALL {
            scans.push(scanner.scan(mode, watermark).await?);
        }

        let new_watermark = scans
            .iter()
            .map(|s| s.max_timestamp)
            .fold(watermark, i64::max);

        let persisted = new_watermark > watermark;
        if persisted {
            self.store
                .put_parameter(&self.config.watermark_key(), &new_watermark.to_string())
                .await?;
        }

        gauge!("review_watermark").set(new_watermark as f64);
        gauge!("review_run_last_ts").set(chrono::Utc::now().timestamp() as f64);

        let report = RunReport {
            previous_watermark: watermark,
            new_watermark,
            scans,
            persisted,
        };
        tracing::info!(
            previous = watermark,
            new = new_watermark,
            admitted = report.admitted(),
            failed = report.delivery_failures(),
            persisted,
            "run finished"
        );
        Ok(report)
    }
}
