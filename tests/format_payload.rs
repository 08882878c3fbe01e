// tests/format_payload.rs
use serde_json::Value as Json;

use steam_review_notifier::notify::format::{clamp_content, format_review, MAX_CONTENT_LENGTH};
use steam_review_notifier::review::{FilterMode, Review};

fn review(text: &str) -> Review {
    Review {
        author_id: "76561198000000042".into(),
        language: "french".into(),
        voted_up: false,
        text: text.into(),
        created_at: 1_699_000_000,
        updated_at: 1_700_000_000,
    }
}

#[test]
fn cut_through_an_open_fence_is_rebalanced() {
    // 2001 chars, a single fence inside the first 1993.
    let body = format!("```{}", "a".repeat(1998));
    assert_eq!(body.chars().count(), 2001);

    let out = clamp_content(&body);
    assert_eq!(out.matches("```").count() % 2, 0);
    assert!(out.chars().count() <= MAX_CONTENT_LENGTH + 3);
    assert!(out.ends_with("...```"));
}

#[test]
fn cut_with_balanced_fences_only_adds_ellipsis() {
    let body = format!("```x``` {}", "b".repeat(2000));
    let out = clamp_content(&body);
    assert_eq!(out.matches("```").count(), 2);
    assert!(out.ends_with("b..."));
}

#[test]
fn updated_review_payload_shape() {
    let r = review("Trop cher @here");
    let msg = format_review("440", &r, FilterMode::Updated, r.updated_at);
    let v: Json = serde_json::to_value(&msg).unwrap();

    assert_eq!(v["username"], "76561198000000042 (french) (updated)");
    assert_eq!(
        v["avatar_url"],
        "https://store.akamai.steamstatic.com/public/shared/images/userreviews/icon_thumbsDown_v6.png"
    );
    assert_eq!(
        v["content"],
        "<http://steamcommunity.com/profiles/76561198000000042/recommended/440/>\n```Trop cher @here```"
    );
    assert_eq!(v["allowed_mentions"]["parse"], serde_json::json!([]));

    let embeds = v["embeds"].as_array().expect("embeds array");
    assert_eq!(embeds.len(), 1);
    assert_eq!(embeds[0]["footer"]["text"], "timestamp: 1700000000");
    assert_eq!(embeds[0]["title"], "");
    assert_eq!(embeds[0]["description"], "");
}

#[test]
fn very_long_review_stays_within_discord_limit() {
    let r = review(&"é".repeat(5000));
    let msg = format_review("440", &r, FilterMode::Recent, r.created_at);
    assert!(msg.content.chars().count() <= MAX_CONTENT_LENGTH);
    // link + opening fence, text cut, closing fence restored
    assert_eq!(msg.content.matches("```").count(), 2);
    assert!(msg.content.ends_with("...```"));
}
