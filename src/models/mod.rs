// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod bundle;
pub mod ladder;
pub mod page;
pub mod window;

pub use bundle::StixBundle;
pub use ladder::{FallbackLadder, LadderEntry, ResponseFormat};
pub use page::Page;
pub use window::TimeWindow;
