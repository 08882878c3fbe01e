// src/review.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One user review as returned by the store reviews feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub author_id: String,
    pub language: String, // e.g. "english", "schinese"
    pub voted_up: bool,
    pub text: String,
    pub created_at: i64, // unix seconds
    pub updated_at: i64, // unix seconds, >= created_at
}

impl Review {
    /// Never edited since it was posted.
    pub fn is_unedited(&self) -> bool {
        self.created_at == self.updated_at
    }
}

/// Which ordering of the feed is being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Ordered by creation time; surfaces new reviews.
    Recent,
    /// Ordered by update time; surfaces edits to older reviews.
    Updated,
}

impl FilterMode {
    pub const ALL: [FilterMode; 2] = [FilterMode::Recent, FilterMode::Updated];

    /// Value of the feed's `filter` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::Recent => "recent",
            FilterMode::Updated => "updated",
        }
    }

    /// Whether a review belongs to this mode. The two modes are disjoint so one
    /// review never produces two notifications in the same run.
    pub fn owns(self, review: &Review) -> bool {
        match self {
            FilterMode::Recent => review.is_unedited(),
            FilterMode::Updated => !review.is_unedited(),
        }
    }

    /// The mode's sort key, shown in the notification footer.
    pub fn display_timestamp(self, review: &Review) -> i64 {
        match self {
            FilterMode::Recent => review.created_at,
            FilterMode::Updated => review.updated_at,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One response of the paged feed. An empty cursor means no more pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub reviews: Vec<Review>,
    pub cursor: String,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.cursor.is_empty()
    }
}
