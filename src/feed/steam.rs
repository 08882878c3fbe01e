// src/feed/steam.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::FeedError;
use crate::feed::{ReviewFeed, PAGE_SIZE};
use crate::review::{FilterMode, Page, Review};

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    // Steam omits `reviews` (or sends null) once the feed is exhausted.
    #[serde(default)]
    reviews: Option<Vec<WireReview>>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReview {
    #[serde(default)]
    review: String,
    author: WireAuthor,
    #[serde(default)]
    language: String,
    #[serde(default)]
    voted_up: bool,
    timestamp_created: i64,
    timestamp_updated: i64,
}

#[derive(Debug, Deserialize)]
struct WireAuthor {
    steamid: String,
}

impl From<WireReview> for Review {
    fn from(w: WireReview) -> Self {
        Review {
            author_id: w.author.steamid,
            language: w.language,
            voted_up: w.voted_up,
            text: w.review,
            created_at: w.timestamp_created,
            updated_at: w.timestamp_updated,
        }
    }
}

/// Reads `GET {base}/appreviews/{app_id}` from the Steam store.
/// https://partner.steamgames.com/doc/store/getreviews
pub struct SteamReviewFeed {
    base_url: String,
    app_id: String,
    client: Client,
}

impl SteamReviewFeed {
    pub fn new(base_url: &str, app_id: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            client,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, FeedError> {
        Self::new(
            &cfg.feed_base_url,
            &cfg.app_id,
            Duration::from_secs(cfg.http_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/appreviews/{}", self.base_url, self.app_id)
    }

    /// Decode one response body. Missing `reviews` or `cursor` decode as empty.
    pub fn decode_page(body: &str) -> Result<Page, FeedError> {
        let res: ReviewsResponse = serde_json::from_str(body)?;
        Ok(Page {
            reviews: res
                .reviews
                .unwrap_or_default()
                .into_iter()
                .map(Review::from)
                .collect(),
            cursor: res.cursor.unwrap_or_default(),
        })
    }

    /// The GET for one page: all languages, review and purchase types.
    pub fn page_request(&self, cursor: &str, mode: FilterMode) -> Result<Request, FeedError> {
        let page_size = PAGE_SIZE.to_string();
        let req = self
            .client
            .get(self.endpoint())
            .query(&[
                ("json", "1"),
                ("filter", mode.as_str()),
                ("language", "all"),
                ("review_type", "all"),
                ("purchase_type", "all"),
                ("num_per_page", page_size.as_str()),
                ("cursor", cursor),
            ])
            .build()?;
        Ok(req)
    }
}

/// Any non-2xx answer (rate limit, outage page) makes the page unavailable.
pub fn check_status(status: StatusCode) -> Result<(), FeedError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FeedError::Status(status.as_u16()))
    }
}

#[async_trait]
impl ReviewFeed for SteamReviewFeed {
    async fn fetch(&self, cursor: &str, mode: FilterMode) -> Result<Page, FeedError> {
        let t0 = std::time::Instant::now();

        let req = self.page_request(cursor, mode)?;
        let resp = self.client.execute(req).await?;
        check_status(resp.status())?;
        let body = resp.text().await?;
        let page = Self::decode_page(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("review_feed_fetch_ms").record(ms);
        tracing::debug!(
            mode = %mode,
            reviews = page.reviews.len(),
            next_cursor = %page.cursor,
            "fetched review page"
        );
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "Steam"
    }
}
