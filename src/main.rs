//! Steam review notifier: binary entrypoint.
//! Runs the notifier once, or on a fixed interval when `POLL_INTERVAL_SECS` is set.

use anyhow::Context;
use steam_review_notifier::config::AppConfig;
use steam_review_notifier::coordinator::RunCoordinator;
use steam_review_notifier::feed::SteamReviewFeed;
use steam_review_notifier::notify::DiscordWebhook;
use steam_review_notifier::scheduler;
use steam_review_notifier::store::FileParameterStore;
use steam_review_notifier::telemetry::{self, Metrics};

fn log_metrics(metrics: Option<&Metrics>) {
    if let Some(m) = metrics {
        tracing::info!(target: "metrics", "\n{}", m.render());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    // Fail fast: nothing touches the network or the store before this passes.
    let config = AppConfig::from_env().context("invalid configuration")?;

    let metrics = if config.metrics_log {
        Some(Metrics::init()?)
    } else {
        None
    };

    let store = FileParameterStore::new(&config.parameter_store_file);
    let feed = SteamReviewFeed::from_config(&config).context("building feed client")?;
    let sink = DiscordWebhook::from_config(&config);
    let coordinator = RunCoordinator::new(&config, &store, &feed, &sink);

    match config.poll_interval_secs {
        Some(secs) => {
            let coordinator = &coordinator;
            let metrics = metrics.as_ref();
            tracing::info!(interval_secs = secs, "polling");
            scheduler::run_every(secs, None, move || async move {
                let res = coordinator.run().await;
                log_metrics(metrics);
                res
            })
            .await;
        }
        None => {
            coordinator.run().await.context("notifier run failed")?;
            log_metrics(metrics.as_ref());
        }
    }
    Ok(())
}
