// src/feed/fixture.rs
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::FeedError;
use crate::feed::ReviewFeed;
use crate::review::{FilterMode, Page};

/// Scripted feed for tests and dry runs. Pages are keyed by `(mode, cursor)`;
/// an unscripted key yields an empty page.
#[derive(Default)]
pub struct FixtureFeed {
    pages: HashMap<(FilterMode, String), Page>,
    failing: HashSet<(FilterMode, String)>,
    calls: Mutex<Vec<(FilterMode, String)>>,
}

impl FixtureFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, mode: FilterMode, cursor: &str, page: Page) -> Self {
        self.pages.insert((mode, cursor.to_string()), page);
        self
    }

    /// Same as `with_page`, decoding a raw Steam response body.
    pub fn with_json(self, mode: FilterMode, cursor: &str, body: &str) -> Result<Self, FeedError> {
        let page = super::SteamReviewFeed::decode_page(body)?;
        Ok(self.with_page(mode, cursor, page))
    }

    /// Make the fetch for `(mode, cursor)` fail like an unavailable upstream.
    pub fn failing_at(mut self, mode: FilterMode, cursor: &str) -> Self {
        self.failing.insert((mode, cursor.to_string()));
        self
    }

    /// Every fetch made so far, in order.
    pub fn calls(&self) -> Vec<(FilterMode, String)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ReviewFeed for FixtureFeed {
    async fn fetch(&self, cursor: &str, mode: FilterMode) -> Result<Page, FeedError> {
        let key = (mode, cursor.to_string());
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.clone());

        if self.failing.contains(&key) {
            return Err(FeedError::Status(503));
        }
        Ok(self.pages.get(&key).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "Fixture"
    }
}
