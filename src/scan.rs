//! Incremental scan of one feed ordering against the stored watermark.
//!
//! Admission is decided per review and never relies on the feed being sorted:
//! a review is new when `updated_at > watermark`, and belongs to exactly one of
//! the two modes (unedited -> `recent`, edited -> `updated`). The scan stops on
//! the first empty page, whatever cursor came with it.

use metrics::counter;

use crate::error::FeedError;
use crate::feed::{ReviewFeed, START_CURSOR};
use crate::notify::{format_review, NotificationSink};
use crate::review::{FilterMode, Review};
use crate::telemetry::ensure_metrics_described;

/// Verdict for one fetched review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    /// Last modified at or before the watermark; handled by an earlier run.
    Stale,
    /// New, but announced by the other mode's pass.
    OtherMode,
}

pub fn admit(mode: FilterMode, watermark: i64, review: &Review) -> Admission {
    if review.updated_at <= watermark {
        Admission::Stale
    } else if !mode.owns(review) {
        Admission::OtherMode
    } else {
        Admission::Admit
    }
}

/// What one pass over a feed ordering did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub mode: FilterMode,
    /// Highest `updated_at` among admitted reviews, or the input watermark.
    pub max_timestamp: i64,
    pub pages: u32,
    pub admitted: u32,
    pub skipped_stale: u32,
    pub skipped_mode: u32,
    /// Admitted reviews whose notification was rejected. They still count
    /// toward `max_timestamp`.
    pub delivery_failures: u32,
}

impl ScanOutcome {
    fn new(mode: FilterMode, watermark: i64) -> Self {
        Self {
            mode,
            max_timestamp: watermark,
            pages: 0,
            admitted: 0,
            skipped_stale: 0,
            skipped_mode: 0,
            delivery_failures: 0,
        }
    }
}

pub struct IncrementalScanner<'a> {
    feed: &'a dyn ReviewFeed,
    sink: &'a dyn NotificationSink,
    app_id: &'a str,
}

impl<'a> IncrementalScanner<'a> {
    pub fn new(feed: &'a dyn ReviewFeed, sink: &'a dyn NotificationSink, app_id: &'a str) -> Self {
        Self { feed, sink, app_id }
    }

    /// Page through `mode` from the start, notifying for every admitted review.
    /// A feed failure aborts the scan; delivery failures do not.
    pub async fn scan(&self, mode: FilterMode, watermark: i64) -> Result<ScanOutcome, FeedError> {
        ensure_metrics_described();
        let label = mode.as_str();
        let mut out = ScanOutcome::new(mode, watermark);
        let mut cursor = START_CURSOR.to_string();

        while !cursor.is_empty() {
            let page = self.feed.fetch(&cursor, mode).await?;
            out.pages += 1;
            counter!("review_feed_pages_total", "mode" => label).increment(1);

            // An exhausted feed may keep handing out a cursor.
            if page.reviews.is_empty() {
                break;
            }
            counter!("reviews_fetched_total", "mode" => label)
                .increment(page.reviews.len() as u64);

            for review in &page.reviews {
                match admit(mode, watermark, review) {
                    Admission::Stale => {
                        out.skipped_stale += 1;
                        counter!("reviews_skipped_total", "mode" => label, "reason" => "stale")
                            .increment(1);
                    }
                    Admission::OtherMode => {
                        out.skipped_mode += 1;
                        counter!("reviews_skipped_total", "mode" => label, "reason" => "mode")
                            .increment(1);
                    }
                    Admission::Admit => {
                        out.admitted += 1;
                        out.max_timestamp = out.max_timestamp.max(review.updated_at);
                        counter!("reviews_admitted_total", "mode" => label).increment(1);
                        if !self.notify(mode, review).await {
                            out.delivery_failures += 1;
                        }
                    }
                }
            }

            if page.cursor == cursor {
                tracing::warn!(mode = %mode, cursor = %cursor, "feed repeated the requested cursor, stopping");
                break;
            }
            cursor = page.cursor;
        }

        tracing::info!(
            mode = %mode,
            pages = out.pages,
            admitted = out.admitted,
            stale = out.skipped_stale,
            other_mode = out.skipped_mode,
            failed = out.delivery_failures,
            max_ts = out.max_timestamp,
            "scan finished"
        );
        Ok(out)
    }

    async fn notify(&self, mode: FilterMode, review: &Review) -> bool {
        let shown_ts = mode.display_timestamp(review);
        let msg = format_review(self.app_id, review, mode, shown_ts);

        match self.sink.deliver(&msg).await {
            Ok(()) => {
                tracing::debug!(mode = %mode, author = %review.author_id, ts = shown_ts, "review sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, mode = %mode, author = %review.author_id, "failed sending webhook");
                counter!("webhook_delivery_failures_total").increment(1);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(created_at: i64, updated_at: i64) -> Review {
        Review {
            author_id: "1".into(),
            language: "english".into(),
            voted_up: true,
            text: String::new(),
            created_at,
            updated_at,
        }
    }

    #[test]
    fn watermark_boundary_is_stale() {
        assert_eq!(admit(FilterMode::Recent, 1000, &review(1000, 1000)), Admission::Stale);
        assert_eq!(admit(FilterMode::Recent, 1000, &review(1001, 1001)), Admission::Admit);
    }

    #[test]
    fn staleness_is_judged_on_update_time() {
        // Created long ago, edited after the watermark.
        assert_eq!(admit(FilterMode::Updated, 1000, &review(10, 1600)), Admission::Admit);
        assert_eq!(admit(FilterMode::Recent, 1000, &review(10, 1600)), Admission::OtherMode);
        // Edited, but the edit is already behind the watermark.
        assert_eq!(admit(FilterMode::Updated, 1000, &review(10, 900)), Admission::Stale);
    }

    #[test]
    fn fresh_review_belongs_to_recent_only() {
        assert_eq!(admit(FilterMode::Updated, 1000, &review(1500, 1500)), Admission::OtherMode);
        assert_eq!(admit(FilterMode::Recent, 1000, &review(1500, 1500)), Admission::Admit);
    }
}
