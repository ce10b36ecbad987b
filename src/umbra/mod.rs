//! Shadow-path search.
//!
//! Decides whether an observer is inside the umbra at any sampled instant
//! and recovers the first and last sample times of containment. Precision
//! is limited to the dataset's sampling interval (one second for the NASA
//! shapes); no interpolation between footprints is attempted.
//!
//! - [`dataset`]: feature access and GeoJSON loading
//! - [`locator`]: the locality-biased search
//! - [`error`]: configuration error kinds

pub mod dataset;
pub mod error;
pub mod locator;

pub use dataset::{DatasetFields, GeoJsonDataset, ShadowDataset, ShadowFeature};
pub use error::UmbraError;
pub use locator::{LocatorTuning, ScanStats, Totality, UmbraLocator};
