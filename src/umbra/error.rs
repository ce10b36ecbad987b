//! Configuration errors raised by the shadow dataset and locator.

use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unrecoverable dataset problems. "Not in the shadow" is never an error.
#[derive(Debug, Error)]
pub enum UmbraError {
    #[error("Failed to open shadow dataset {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Shadow dataset {} has no layer named '{layer}'", path.display())]
    LayerMissing { path: PathBuf, layer: String },

    #[error("Shadow feature {index} has no numeric '{field}' attribute")]
    Attribute { index: usize, field: String },

    #[error("Shadow dataset has no feature at index {index}")]
    FeatureMissing { index: usize },
}
