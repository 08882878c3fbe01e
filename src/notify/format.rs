//! Webhook payload construction for review notifications.
//!
//! Discord rejects embeds whose title exceeds 256 chars or whose description
//! exceeds 4096, and message content above 2000. All three are clamped here.
//! Lengths are UTF-16 code units, the unit Discord counts in; a cut never
//! splits a character.

use serde::Serialize;

use crate::review::{FilterMode, Review};

pub const MAX_EMBED_TITLE_LENGTH: usize = 256;
pub const MAX_EMBED_DESCRIPTION_LENGTH: usize = 4096;
pub const MAX_CONTENT_LENGTH: usize = 2000;

const CODE_FENCE: &str = "```";
const ELLIPSIS: &str = "...";
// Room kept for the ellipsis plus a closing fence.
const CONTENT_TRUNCATION_RESERVE: usize = 7;

const ICON_BASE: &str = "https://store.akamai.steamstatic.com/public/shared/images/userreviews";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Unvalidated embed settings. Turn into a `WebhookEmbed` via `WebhookEmbed::new`.
#[derive(Debug, Clone, Default)]
pub struct EmbedSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<f64>,
    pub timestamp: Option<String>,
    pub footer: Option<String>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEmbed {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl WebhookEmbed {
    /// Clamp title and description, floor the color, drop empty optionals.
    pub fn new(spec: EmbedSpec) -> Self {
        Self {
            title: spec
                .title
                .map(|t| take_utf16(&t, MAX_EMBED_TITLE_LENGTH - 1))
                .unwrap_or_default(),
            description: spec
                .description
                .map(|d| take_utf16(&d, MAX_EMBED_DESCRIPTION_LENGTH - 1))
                .unwrap_or_default(),
            color: spec
                .color
                .filter(|c| c.is_finite())
                .map(|c| c.floor() as i64),
            timestamp: spec.timestamp.filter(|t| !t.is_empty()),
            footer: spec
                .footer
                .filter(|f| !f.is_empty())
                .map(|text| EmbedFooter { text }),
            fields: spec.fields,
        }
    }

    pub fn with_footer(text: impl Into<String>) -> Self {
        Self::new(EmbedSpec {
            footer: Some(text.into()),
            ..EmbedSpec::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedMentions {
    parse: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub avatar_url: String,
    pub username: String,
    pub content: String,
    allowed_mentions: AllowedMentions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<WebhookEmbed>,
}

impl WebhookMessage {
    /// Mentions are always disabled; review text is untrusted.
    pub fn new(
        username: impl Into<String>,
        avatar_url: impl Into<String>,
        content: &str,
        embeds: Vec<WebhookEmbed>,
    ) -> Self {
        Self {
            avatar_url: avatar_url.into(),
            username: username.into(),
            content: clamp_content(content),
            allowed_mentions: AllowedMentions { parse: vec![] },
            embeds,
        }
    }

    pub fn mentions_suppressed(&self) -> bool {
        self.allowed_mentions.parse.is_empty()
    }
}

/// Cap message content at `MAX_CONTENT_LENGTH` UTF-16 units. Over-long content
/// keeps its first 1993 units plus `...`, and gets a closing fence if the cut
/// left a code block open.
pub fn clamp_content(content: &str) -> String {
    if utf16_len(content) <= MAX_CONTENT_LENGTH {
        return content.to_string();
    }

    let mut out = take_utf16(content, MAX_CONTENT_LENGTH - CONTENT_TRUNCATION_RESERVE);
    out.push_str(ELLIPSIS);
    if out.matches(CODE_FENCE).count() % 2 != 0 {
        out.push_str(CODE_FENCE);
    }
    out
}

pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Longest prefix of `s` that fits in `max` UTF-16 units.
fn take_utf16(s: &str, max: usize) -> String {
    let mut units = 0;
    s.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= max
        })
        .collect()
}

/// Public profile page of the review, linked above the review body.
pub fn review_permalink(app_id: &str, author_id: &str) -> String {
    format!("http://steamcommunity.com/profiles/{author_id}/recommended/{app_id}/")
}

pub fn avatar_url(voted_up: bool) -> String {
    let icon = if voted_up {
        "icon_thumbsUp_v6"
    } else {
        "icon_thumbsDown_v6"
    };
    format!("{ICON_BASE}/{icon}.png")
}

pub fn display_name(review: &Review, mode: FilterMode) -> String {
    let mut name = review.author_id.clone();
    if review.language != "english" {
        name.push_str(&format!(" ({})", review.language));
    }
    if mode == FilterMode::Updated {
        name.push_str(" (updated)");
    }
    name
}

/// Build the webhook message announcing `review`.
pub fn format_review(
    app_id: &str,
    review: &Review,
    mode: FilterMode,
    display_timestamp: i64,
) -> WebhookMessage {
    let link = review_permalink(app_id, &review.author_id);
    let content = format!("<{link}>\n{CODE_FENCE}{}{CODE_FENCE}", review.text);

    WebhookMessage::new(
        display_name(review, mode),
        avatar_url(review.voted_up),
        &content,
        vec![WebhookEmbed::with_footer(format!(
            "timestamp: {display_timestamp}"
        ))],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(lang: &str, voted_up: bool, text: &str) -> Review {
        Review {
            author_id: "76561198012345678".into(),
            language: lang.into(),
            voted_up,
            text: text.into(),
            created_at: 1500,
            updated_at: 1500,
        }
    }

    #[test]
    fn username_labels_language_and_update() {
        let r = review("german", true, "gut");
        assert_eq!(
            display_name(&r, FilterMode::Recent),
            "76561198012345678 (german)"
        );
        assert_eq!(
            display_name(&r, FilterMode::Updated),
            "76561198012345678 (german) (updated)"
        );
        let en = review("english", true, "good");
        assert_eq!(display_name(&en, FilterMode::Recent), "76561198012345678");
    }

    #[test]
    fn avatar_tracks_vote() {
        assert!(avatar_url(true).ends_with("icon_thumbsUp_v6.png"));
        assert!(avatar_url(false).ends_with("icon_thumbsDown_v6.png"));
    }

    #[test]
    fn body_is_link_then_fenced_text() {
        let msg = format_review("440", &review("english", false, "meh"), FilterMode::Recent, 1500);
        assert_eq!(
            msg.content,
            "<http://steamcommunity.com/profiles/76561198012345678/recommended/440/>\n```meh```"
        );
        assert_eq!(msg.embeds.len(), 1);
        assert_eq!(
            msg.embeds[0].footer.as_ref().map(|f| f.text.as_str()),
            Some("timestamp: 1500")
        );
        assert!(msg.mentions_suppressed());
    }

    #[test]
    fn short_content_is_untouched() {
        let s = "x".repeat(MAX_CONTENT_LENGTH);
        assert_eq!(clamp_content(&s), s);
    }

    #[test]
    fn long_content_without_fences_gets_ellipsis_only() {
        let s = "y".repeat(2500);
        let out = clamp_content(&s);
        assert_eq!(out.chars().count(), 1996);
        assert!(out.ends_with("y..."));
    }

    #[test]
    fn open_fence_after_cut_is_closed() {
        let s = format!("```{}", "z".repeat(3000));
        let out = clamp_content(&s);
        assert!(out.ends_with("...```"));
        assert_eq!(out.matches("```").count(), 2);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let s = "ж".repeat(2100);
        let out = clamp_content(&s);
        assert_eq!(out.chars().count(), 1996);
    }

    #[test]
    fn astral_chars_count_as_two_units() {
        // 1100 emoji = 2200 UTF-16 units, over the limit although only 1100 chars.
        let s = "😀".repeat(1100);
        let out = clamp_content(&s);
        assert_eq!(out, format!("{}...", "😀".repeat(996)));
        assert_eq!(utf16_len(&out), 1995);

        let fits = "😀".repeat(1000);
        assert_eq!(clamp_content(&fits), fits);
    }

    #[test]
    fn embed_clamps_and_floors() {
        let embed = WebhookEmbed::new(EmbedSpec {
            title: Some("t".repeat(400)),
            description: Some("d".repeat(5000)),
            color: Some(16_711_680.9),
            ..EmbedSpec::default()
        });
        assert_eq!(embed.title.chars().count(), 255);
        assert_eq!(embed.description.chars().count(), 4095);
        assert_eq!(embed.color, Some(16_711_680));
        assert!(embed.footer.is_none());
    }

    #[test]
    fn absent_title_and_description_serialize_as_empty() {
        let v = serde_json::to_value(WebhookEmbed::with_footer("timestamp: 1")).unwrap();
        assert_eq!(v["title"], "");
        assert_eq!(v["description"], "");
        assert_eq!(v["footer"]["text"], "timestamp: 1");
        assert!(v.get("color").is_none());
        assert!(v.get("timestamp").is_none());
        assert!(v.get("fields").is_none());
    }
}
