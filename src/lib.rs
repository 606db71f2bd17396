// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod platform;
pub mod stix;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, FeedConfig, PlatformConfig, PlatformMode, PollingConfig};
pub use error::{ConnectorError, Result};
pub use feed::{FeedSession, Fetcher, FilterResolver, PaginationCollector, RetryPolicy};
pub use models::{FallbackLadder, LadderEntry, Page, ResponseFormat, StixBundle, TimeWindow};
pub use pipeline::{CycleOutcome, CycleReport, PollingOrchestrator};
pub use platform::{BundleImporter, DirectoryImporter, HttpBundleImporter, ImportStats};
pub use stix::{BundlePackager, ItemShape, ShapeNormalizer};
pub use utils::Validator;
