// file: src/platform/mod.rs
// description: destination platform import module exports
// reference: internal module structure

pub mod directory;
pub mod http;
pub mod importer;

pub use directory::DirectoryImporter;
pub use http::HttpBundleImporter;
pub use importer::{BundleImporter, ImportDispatcher, ImportStats};
