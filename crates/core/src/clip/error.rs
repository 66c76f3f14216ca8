//! Error types for clip resolution.

use thiserror::Error;

/// Errors that can occur while resolving clips against the asset store.
#[derive(Debug, Error)]
pub enum ClipError {
    /// A named clip does not exist in the asset store.
    #[error("Asset not found: {name}")]
    AssetNotFound { name: String },

    /// One or both members of an alpha matte pair are missing.
    #[error("Incomplete alpha matte pair ({color} + {alpha}), missing: {}", .missing.join(", "))]
    IncompletePair {
        color: String,
        alpha: String,
        missing: Vec<String>,
    },

    /// The asset was located but its stream could not be opened.
    #[error("Failed to open asset {name}")]
    Open {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClipError {
    /// Asset names this error is about.
    pub fn missing_assets(&self) -> Vec<&str> {
        match self {
            Self::AssetNotFound { name } => vec![name.as_str()],
            Self::IncompletePair { missing, .. } => missing.iter().map(String::as_str).collect(),
            Self::Open { name, .. } => vec![name.as_str()],
        }
    }
}
