//! Prints the webhook payloads the notifier would send, without sending them.
//!
//! Usage: review_preview [STEAM_RESPONSE.json] [recent|updated] [APP_ID]
//! Without a file, a couple of built-in sample reviews are formatted.

use anyhow::{bail, Context, Result};
use steam_review_notifier::feed::SteamReviewFeed;
use steam_review_notifier::notify::format_review;
use steam_review_notifier::review::{FilterMode, Review};

fn samples() -> Vec<Review> {
    vec![
        Review {
            author_id: "76561197960287930".into(),
            language: "english".into(),
            voted_up: true,
            text: "Great co-op, @everyone should try it.".into(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        },
        Review {
            author_id: "76561197960287931".into(),
            language: "brazilian".into(),
            voted_up: false,
            text: "x".repeat(2_100),
            created_at: 1_690_000_000,
            updated_at: 1_700_000_500,
        },
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mode = match args.get(1).map(String::as_str) {
        None | Some("recent") => FilterMode::Recent,
        Some("updated") => FilterMode::Updated,
        Some(other) => bail!("unknown mode {other:?}, expected recent|updated"),
    };
    let app_id = args.get(2).map(String::as_str).unwrap_or("440");

    let reviews = match args.first() {
        Some(path) => {
            let body = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            SteamReviewFeed::decode_page(&body)
                .with_context(|| format!("decoding {path}"))?
                .reviews
        }
        None => samples(),
    };

    for review in &reviews {
        let msg = format_review(app_id, review, mode, mode.display_timestamp(review));
        println!("{}", serde_json::to_string_pretty(&msg)?);
    }

    println!("review-preview done ({} reviews)", reviews.len());
    Ok(())
}
