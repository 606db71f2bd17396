// file: src/stix/mod.rs
// description: STIX normalization and packaging module exports
// reference: internal module structure

pub mod normalizer;
pub mod packager;

pub use normalizer::{ItemShape, ShapeNormalizer};
pub use packager::{BundlePackager, DEFAULT_MAX_OBJECTS_PER_BUNDLE};
