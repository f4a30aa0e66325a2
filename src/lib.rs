//! Body composition partitioning and projection.
//!
//! Predicts how a change in body weight splits between fat and lean mass, and
//! projects the resulting FFMI and body-fat percentage as pessimistic, expected
//! and optimistic scenarios.

pub mod body_composition;
pub mod calibration;
pub mod domain;
pub mod error;
pub mod formulas;
pub mod partitioning;
pub mod projection;
pub mod scenario;

pub use domain::{BiologicalSex, DexaScan, PartitioningInputs, TrainingAge};
pub use error::{ProjectionError, ScenarioError};
pub use partitioning::{LossPartitioning, RatioRange, calculate_p_ratio};
pub use projection::{
    BodyCompProjection, ConfidenceLevel, GainPartitioning, Scenarios, calculate_muscle_gain_ratio,
    predict_body_composition, predict_weight_gain_composition, predict_weight_gain_from_partitioning,
    predict_weight_loss_composition,
};
