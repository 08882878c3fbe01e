// src/feed/mod.rs
pub mod fixture;
pub mod steam;

use crate::error::FeedError;
use crate::review::{FilterMode, Page};

/// Cursor the feed understands as "first page".
pub const START_CURSOR: &str = "*";

/// Reviews requested per page.
pub const PAGE_SIZE: u32 = 100;

/// One page read against the external reviews feed.
///
/// Implementations do not retry; a failed fetch aborts the run and the next
/// run re-reads the same window.
#[async_trait::async_trait]
pub trait ReviewFeed: Send + Sync {
    async fn fetch(&self, cursor: &str, mode: FilterMode) -> Result<Page, FeedError>;
    fn name(&self) -> &'static str;
}

pub use fixture::FixtureFeed;
pub use steam::SteamReviewFeed;
