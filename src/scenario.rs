//! Scenario files and batch evaluation.
//!
//! A scenario file is JSON describing one or more named starting points and
//! target weights. Each scenario is routed to the loss or gain projector by the
//! direction of the weight change.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body_composition::{CalibrationConfig, personal_p_ratio_history};
use crate::domain::{DexaScan, PartitioningInputs};
use crate::error::ScenarioError;
use crate::partitioning::{LossPartitioning, calculate_p_ratio};
use crate::projection::{
    BodyCompProjection, GainPartitioning, calculate_muscle_gain_ratio, predict_body_composition,
    predict_weight_gain_from_partitioning,
};

/// Contents of a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    pub scenarios: Vec<Scenario>,
}

/// A single projection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub current_weight_kg: f64,
    pub target_weight_kg: f64,
    pub height_cm: f64,
    pub inputs: PartitioningInputs,
    /// Prior scans, used for calibration when `inputs` carries no history.
    #[serde(default)]
    pub scans: Vec<DexaScan>,
}

/// Partitioning behind a projection, tagged by direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "direction", rename_all = "lowercase")]
pub enum Partitioning {
    Loss(LossPartitioning),
    Gain(GainPartitioning),
}

/// Evaluation result for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub partitioning: Partitioning,
    pub projection: BodyCompProjection,
}

/// Loads a scenario file from disk.
///
/// # Errors
/// Returns ScenarioError if the file is missing, unreadable, not valid JSON,
/// or lists no scenarios.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<ScenarioFile, ScenarioError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::CannotRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_scenarios(&contents)
}

/// Parses scenario JSON.
pub fn parse_scenarios(json: &str) -> Result<ScenarioFile, ScenarioError> {
    let file: ScenarioFile = serde_json::from_str(json)?;

    if file.scenarios.is_empty() {
        return Err(ScenarioError::Empty);
    }

    Ok(file)
}

/// Evaluates one scenario.
///
/// Losses run the P-ratio calculator and the loss projector; gains run the
/// muscle-gain model. Personal history is derived from `scans` when the inputs
/// do not already carry one.
pub fn evaluate_scenario(
    scenario: &Scenario,
    calibration: &CalibrationConfig,
) -> Result<ScenarioOutcome, ScenarioError> {
    let inputs = resolve_inputs(scenario, calibration);
    let current = scenario.current_weight_kg;
    let target = scenario.target_weight_kg;
    let body_fat = inputs.current_body_fat_percent;

    log::info!(
        "{}: {} {}, {:.1} -> {:.1} kg",
        scenario.name,
        inputs.training_age,
        inputs.biological_sex,
        current,
        target
    );

    let to_scenario_error = |source| ScenarioError::Projection {
        name: scenario.name.clone(),
        source,
    };

    if target < current {
        let loss = calculate_p_ratio(&inputs);
        let projection = predict_body_composition(current, target, body_fat, scenario.height_cm, &loss)
            .map_err(to_scenario_error)?;

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            partitioning: Partitioning::Loss(loss),
            projection,
        })
    } else if target > current {
        let gain = calculate_muscle_gain_ratio(&inputs);
        let projection =
            predict_weight_gain_from_partitioning(current, target, body_fat, scenario.height_cm, &gain)
                .map_err(to_scenario_error)?;

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            partitioning: Partitioning::Gain(gain),
            projection,
        })
    } else {
        Err(ScenarioError::NoWeightChange(scenario.name.clone()))
    }
}

/// Evaluates every scenario in the file.
///
/// Scenarios are independent, so they run in parallel via rayon. Results keep
/// the order of the file.
pub fn evaluate_scenarios(file: &ScenarioFile) -> Vec<Result<ScenarioOutcome, ScenarioError>> {
    file.scenarios
        .par_iter()
        .map(|scenario| evaluate_scenario(scenario, &file.calibration))
        .collect()
}

fn resolve_inputs(scenario: &Scenario, calibration: &CalibrationConfig) -> PartitioningInputs {
    let mut inputs = scenario.inputs.clone();

    if !inputs.has_personal_history() && !scenario.scans.is_empty() {
        inputs.personal_p_ratio_history = personal_p_ratio_history(&scenario.scans, calibration);
        log::info!(
            "{}: derived {} personal ratios from {} scans",
            scenario.name,
            inputs.personal_p_ratio_history.len(),
            scenario.scans.len()
        );
    }

    inputs
}
