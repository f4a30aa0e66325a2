//! Error types for the body composition engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when a projector is called for the wrong direction of weight change.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(
        "predicted weight {predicted_kg} kg is not below current weight {current_kg} kg; \
         use the weight-gain projector for gain scenarios"
    )]
    NotAWeightLoss { current_kg: f64, predicted_kg: f64 },

    #[error("predicted weight {predicted_kg} kg is not above current weight {current_kg} kg")]
    NotAWeightGain { current_kg: f64, predicted_kg: f64 },
}

/// Errors that can occur when loading or evaluating scenario files.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("cannot read file {path}: {source}")]
    CannotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("scenario file contains no scenarios")]
    Empty,

    #[error("scenario '{0}': current and target weight are equal, nothing to project")]
    NoWeightChange(String),

    #[error("scenario '{name}': {source}")]
    Projection {
        name: String,
        #[source]
        source: ProjectionError,
    },
}
