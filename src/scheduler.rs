// src/scheduler.rs
use std::future::Future;
use std::time::Duration;

use metrics::counter;

use crate::coordinator::RunReport;
use crate::error::Result;

/// Drive `run` on a fixed interval, one run at a time.
///
/// A tick that fires while a run is still going is delayed, never overlapped,
/// so the single-writer assumption on the watermark holds. Failed runs are
/// logged; the next tick retries the same window. Returns after `max_runs`
/// runs when given, otherwise loops forever.
pub async fn run_every<F, Fut>(interval_secs: u64, max_runs: Option<u64>, mut run: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunReport>>,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut runs = 0u64;
    loop {
        if max_runs.is_some_and(|max| runs >= max) {
            return;
        }
        ticker.tick().await;
        runs += 1;

        counter!("review_runs_total").increment(1);
        match run().await {
            Ok(report) => tracing::debug!(
                target: "scheduler",
                admitted = report.admitted(),
                watermark = report.new_watermark,
                "tick done"
            ),
            Err(e) => {
                counter!("review_run_errors_total").increment(1);
                tracing::warn!(target: "scheduler", "run failed: {e:#}");
            }
        }
    }
}
