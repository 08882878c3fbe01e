// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod notify;
pub mod review;
pub mod scan;
pub mod scheduler;
pub mod store;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::coordinator::{RunCoordinator, RunReport};
pub use crate::error::{ConfigError, DeliveryError, Error, FeedError, StoreError};
pub use crate::review::{FilterMode, Page, Review};
pub use crate::scan::{IncrementalScanner, ScanOutcome};
