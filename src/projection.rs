//! Scenario projection of FFMI and body-fat percentage for a target weight.
//!
//! Weight loss uses the fat-fraction P-ratio from [`crate::partitioning`].
//! Weight gain uses a separate muscle-gain ratio, where a higher value means
//! more of the gain is muscle. The two ratios point in opposite directions and
//! are kept as distinct types.

use serde::{Deserialize, Serialize};

use crate::domain::{PartitioningInputs, TrainingAge};
use crate::error::ProjectionError;
use crate::formulas::{calculate_fat_mass, calculate_ffmi, calculate_lbm};
use crate::partitioning::{LossPartitioning, RatioRange};

// === Constants ===

/// Spread below which a loss projection is classed as high confidence.
const HIGH_CONFIDENCE_SPREAD: f64 = 0.12;

/// Spread below which a loss projection is classed as reasonable confidence.
const REASONABLE_CONFIDENCE_SPREAD: f64 = 0.18;

pub const MIN_MUSCLE_GAIN_RATIO: f64 = 0.20;
pub const MAX_MUSCLE_GAIN_RATIO: f64 = 0.80;

/// Cap on the enhanced muscle-gain ratio before the remaining multipliers.
const ENHANCED_MUSCLE_GAIN_CAP: f64 = 0.75;

/// Cap on the optimistic muscle-gain bound.
const MAX_OPTIMISTIC_MUSCLE_GAIN: f64 = 0.85;

/// Factor line attached to every gain projection.
pub const GAIN_PROJECTION_NOTE: &str = "Weight gain partitioning is estimated from training age, \
     enhancement, protein, training volume and surplus size; individual variation is high";

// === Data Structures ===

/// How much to trust a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Reasonable,
    High,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Reasonable => write!(f, "reasonable"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

/// One value per projected scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenarios {
    pub pessimistic: f64,
    pub expected: f64,
    pub optimistic: f64,
}

/// Projected composition at the target weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyCompProjection {
    pub ffmi: Scenarios,
    pub body_fat_percent: Scenarios,
    /// Ratio behind the expected scenario: the P-ratio for losses, the
    /// muscle-gain ratio for gains.
    pub p_ratio_used: f64,
    pub confidence_level: ConfidenceLevel,
    pub factors: Vec<String>,
}

/// Gain-side partitioning: fraction of a weight increase that is lean mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainPartitioning {
    pub muscle_gain_ratio: f64,
    pub confidence_range: RatioRange,
}

/// Composition after applying one scenario's split of the weight change.
#[derive(Debug, Clone, Copy)]
struct ScenarioPoint {
    ffmi: f64,
    body_fat_percent: f64,
}

/// Starting fat and lean mass for a projection.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    fat_kg: f64,
    lean_kg: f64,
}

impl Snapshot {
    fn new(weight_kg: f64, body_fat_percent: f64) -> Self {
        Self {
            fat_kg: calculate_fat_mass(weight_kg, body_fat_percent),
            lean_kg: calculate_lbm(weight_kg, body_fat_percent),
        }
    }

    /// Applies `fat_change`/`lean_change` and evaluates the result at `new_weight_kg`.
    fn project(
        &self,
        fat_change: f64,
        lean_change: f64,
        new_weight_kg: f64,
        height_cm: f64,
    ) -> ScenarioPoint {
        let new_fat = self.fat_kg + fat_change;
        let new_lean = self.lean_kg + lean_change;

        ScenarioPoint {
            ffmi: calculate_ffmi(new_lean, height_cm).normalized_ffmi,
            body_fat_percent: new_fat / new_weight_kg * 100.0,
        }
    }
}

// === Loss Path ===

/// Classifies a loss projection from the width of its P-ratio range.
pub fn classify_confidence(spread: f64) -> ConfidenceLevel {
    if spread < HIGH_CONFIDENCE_SPREAD {
        ConfidenceLevel::High
    } else if spread < REASONABLE_CONFIDENCE_SPREAD {
        ConfidenceLevel::Reasonable
    } else {
        ConfidenceLevel::Low
    }
}

/// Projects composition for a weight loss.
///
/// The low end of the P-ratio range gives the pessimistic scenario (more lean
/// mass lost) and the high end the optimistic one.
///
/// # Errors
/// `ProjectionError::NotAWeightLoss` if `predicted_weight_kg >= current_weight_kg`.
pub fn predict_weight_loss_composition(
    current_weight_kg: f64,
    predicted_weight_kg: f64,
    current_body_fat_percent: f64,
    height_cm: f64,
    partitioning: &LossPartitioning,
) -> Result<BodyCompProjection, ProjectionError> {
    if predicted_weight_kg >= current_weight_kg {
        return Err(ProjectionError::NotAWeightLoss {
            current_kg: current_weight_kg,
            predicted_kg: predicted_weight_kg,
        });
    }

    let weight_change = predicted_weight_kg - current_weight_kg;
    let snapshot = Snapshot::new(current_weight_kg, current_body_fat_percent);

    let at_ratio = |p_ratio: f64| {
        snapshot.project(
            weight_change * p_ratio,
            weight_change * (1.0 - p_ratio),
            predicted_weight_kg,
            height_cm,
        )
    };

    let range = partitioning.confidence_range;
    let pessimistic = at_ratio(range.low);
    let expected = at_ratio(partitioning.final_p_ratio);
    let optimistic = at_ratio(range.high);

    let confidence_level = classify_confidence(range.spread());

    log::debug!(
        "Loss projection {:.1} -> {:.1} kg: BF% {:.1}/{:.1}/{:.1}, confidence {}",
        current_weight_kg,
        predicted_weight_kg,
        pessimistic.body_fat_percent,
        expected.body_fat_percent,
        optimistic.body_fat_percent,
        confidence_level
    );

    Ok(BodyCompProjection {
        ffmi: Scenarios {
            pessimistic: pessimistic.ffmi,
            expected: expected.ffmi,
            optimistic: optimistic.ffmi,
        },
        body_fat_percent: Scenarios {
            pessimistic: pessimistic.body_fat_percent,
            expected: expected.body_fat_percent,
            optimistic: optimistic.body_fat_percent,
        },
        p_ratio_used: partitioning.final_p_ratio,
        confidence_level,
        factors: partitioning.factors.clone(),
    })
}

/// Projects composition for a target weight. Only weight loss is supported here;
/// gain scenarios go through [`predict_weight_gain_composition`].
///
/// # Errors
/// `ProjectionError::NotAWeightLoss` if `predicted_weight_kg >= current_weight_kg`.
pub fn predict_body_composition(
    current_weight_kg: f64,
    predicted_weight_kg: f64,
    current_body_fat_percent: f64,
    height_cm: f64,
    partitioning: &LossPartitioning,
) -> Result<BodyCompProjection, ProjectionError> {
    predict_weight_loss_composition(
        current_weight_kg,
        predicted_weight_kg,
        current_body_fat_percent,
        height_cm,
        partitioning,
    )
}

// === Gain Path ===

/// Calculates the fraction of a weight gain expected to be lean mass.
///
/// Training age sets the starting point; everything after that multiplies.
pub fn calculate_muscle_gain_ratio(inputs: &PartitioningInputs) -> GainPartitioning {
    let mut ratio: f64 = match inputs.training_age {
        TrainingAge::Beginner => 0.55,
        TrainingAge::Intermediate => 0.40,
        TrainingAge::Advanced => 0.30,
    };

    if inputs.is_enhanced {
        ratio = (ratio * 1.5).min(ENHANCED_MUSCLE_GAIN_CAP);
    }

    let protein = inputs.avg_daily_protein_per_kg_bw;
    if protein >= 2.0 {
        ratio *= 1.1;
    } else if protein < 1.4 {
        ratio *= 0.85;
    }

    let sets = inputs.avg_weekly_training_sets;
    if sets < 5.0 {
        ratio *= 0.5;
    } else if sets >= 20.0 {
        ratio *= 1.1;
    }

    let surplus = inputs.energy_balance_magnitude();
    if surplus > 15.0 {
        ratio *= 0.85;
    } else if surplus < 5.0 {
        ratio *= 1.1;
    }

    let muscle_gain_ratio = ratio.clamp(MIN_MUSCLE_GAIN_RATIO, MAX_MUSCLE_GAIN_RATIO);

    GainPartitioning {
        muscle_gain_ratio,
        confidence_range: RatioRange {
            low: muscle_gain_ratio * 0.7,
            high: (muscle_gain_ratio * 1.3).min(MAX_OPTIMISTIC_MUSCLE_GAIN),
        },
    }
}

/// Projects composition for a weight gain.
///
/// The low end of the muscle-gain range gives the pessimistic scenario (more fat
/// gained). Confidence is always low.
///
/// # Errors
/// `ProjectionError::NotAWeightGain` if `predicted_weight_kg <= current_weight_kg`.
pub fn predict_weight_gain_composition(
    current_weight_kg: f64,
    predicted_weight_kg: f64,
    current_body_fat_percent: f64,
    height_cm: f64,
    inputs: &PartitioningInputs,
) -> Result<BodyCompProjection, ProjectionError> {
    predict_weight_gain_from_partitioning(
        current_weight_kg,
        predicted_weight_kg,
        current_body_fat_percent,
        height_cm,
        &calculate_muscle_gain_ratio(inputs),
    )
}

/// Projects composition for a weight gain from an already computed muscle-gain ratio.
///
/// # Errors
/// `ProjectionError::NotAWeightGain` if `predicted_weight_kg <= current_weight_kg`.
pub fn predict_weight_gain_from_partitioning(
    current_weight_kg: f64,
    predicted_weight_kg: f64,
    current_body_fat_percent: f64,
    height_cm: f64,
    gain: &GainPartitioning,
) -> Result<BodyCompProjection, ProjectionError> {
    if predicted_weight_kg <= current_weight_kg {
        return Err(ProjectionError::NotAWeightGain {
            current_kg: current_weight_kg,
            predicted_kg: predicted_weight_kg,
        });
    }

    let weight_change = predicted_weight_kg - current_weight_kg;
    let snapshot = Snapshot::new(current_weight_kg, current_body_fat_percent);

    let at_ratio = |muscle_ratio: f64| {
        snapshot.project(
            weight_change * (1.0 - muscle_ratio),
            weight_change * muscle_ratio,
            predicted_weight_kg,
            height_cm,
        )
    };

    let pessimistic = at_ratio(gain.confidence_range.low);
    let expected = at_ratio(gain.muscle_gain_ratio);
    let optimistic = at_ratio(gain.confidence_range.high);

    log::debug!(
        "Gain projection {:.1} -> {:.1} kg: muscle ratio {:.3}",
        current_weight_kg,
        predicted_weight_kg,
        gain.muscle_gain_ratio
    );

    Ok(BodyCompProjection {
        ffmi: Scenarios {
            pessimistic: pessimistic.ffmi,
            expected: expected.ffmi,
            optimistic: optimistic.ffmi,
        },
        body_fat_percent: Scenarios {
            pessimistic: pessimistic.body_fat_percent,
            expected: expected.body_fat_percent,
            optimistic: optimistic.body_fat_percent,
        },
        p_ratio_used: gain.muscle_gain_ratio,
        confidence_level: ConfidenceLevel::Low,
        factors: vec![GAIN_PROJECTION_NOTE.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::baseline_inputs;
    use crate::partitioning::calculate_p_ratio;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn partitioning(p_ratio: f64, low: f64, high: f64) -> LossPartitioning {
        LossPartitioning {
            final_p_ratio: p_ratio,
            confidence_range: RatioRange { low, high },
            factors: vec!["test factor".to_string()],
        }
    }

    fn surplus_inputs() -> PartitioningInputs {
        let mut inputs = baseline_inputs();
        inputs.energy_balance_percent = 10.0;
        inputs
    }

    // === Confidence Classification ===

    #[test]
    fn test_classify_confidence_boundaries() {
        assert_eq!(classify_confidence(0.08), ConfidenceLevel::High);
        assert_eq!(classify_confidence(0.1199), ConfidenceLevel::High);
        assert_eq!(classify_confidence(0.12), ConfidenceLevel::Reasonable);
        assert_eq!(classify_confidence(0.1799), ConfidenceLevel::Reasonable);
        assert_eq!(classify_confidence(0.18), ConfidenceLevel::Low);
        assert_eq!(classify_confidence(0.35), ConfidenceLevel::Low);
    }

    // === Loss Path ===

    #[test]
    fn test_loss_expected_scenario_values() {
        // 90kg at 25% BF -> 22.5kg fat, 67.5kg lean. Lose 10kg at P=0.80:
        // fat 14.5kg, lean 65.5kg, BF% = 14.5 / 80 = 18.125%
        let p = partitioning(0.80, 0.70, 0.90);
        let projection = predict_weight_loss_composition(90.0, 80.0, 25.0, 180.0, &p).unwrap();

        assert!(approx_eq(projection.body_fat_percent.expected, 18.125, 1e-9));
        let expected_ffmi = calculate_ffmi(65.5, 180.0).normalized_ffmi;
        assert!(approx_eq(projection.ffmi.expected, expected_ffmi, 1e-9));
        assert_eq!(projection.p_ratio_used, 0.80);
        assert_eq!(projection.factors, vec!["test factor".to_string()]);
    }

    #[test]
    fn test_loss_scenario_direction() {
        let result = calculate_p_ratio(&baseline_inputs());
        let projection = predict_weight_loss_composition(85.0, 78.0, 20.0, 178.0, &result).unwrap();

        let bf = projection.body_fat_percent;
        assert!(bf.pessimistic >= bf.expected);
        assert!(bf.expected >= bf.optimistic);

        // Pessimistic loses more lean mass
        assert!(projection.ffmi.pessimistic <= projection.ffmi.optimistic);
    }

    #[test]
    fn test_loss_confidence_from_range() {
        let narrow = partitioning(0.80, 0.75, 0.85);
        let medium = partitioning(0.80, 0.72, 0.88);
        let wide = partitioning(0.70, 0.50, 0.90);

        let classify = |p: &LossPartitioning| {
            predict_weight_loss_composition(90.0, 85.0, 20.0, 180.0, p)
                .unwrap()
                .confidence_level
        };

        assert_eq!(classify(&narrow), ConfidenceLevel::High);
        assert_eq!(classify(&medium), ConfidenceLevel::Reasonable);
        assert_eq!(classify(&wide), ConfidenceLevel::Low);
    }

    #[test]
    fn test_loss_rejects_gain_and_maintenance() {
        let p = calculate_p_ratio(&baseline_inputs());

        let err = predict_body_composition(80.0, 85.0, 20.0, 180.0, &p).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::NotAWeightLoss {
                current_kg: 80.0,
                predicted_kg: 85.0
            }
        );

        assert!(predict_body_composition(80.0, 80.0, 20.0, 180.0, &p).is_err());
        assert!(predict_weight_loss_composition(80.0, 80.5, 20.0, 180.0, &p).is_err());
    }

    #[test]
    fn test_dispatcher_matches_loss_branch() {
        let p = calculate_p_ratio(&baseline_inputs());
        let a = predict_body_composition(92.0, 86.0, 22.0, 183.0, &p).unwrap();
        let b = predict_weight_loss_composition(92.0, 86.0, 22.0, 183.0, &p).unwrap();
        assert_eq!(a, b);
    }

    // === Gain Path ===

    #[test]
    fn test_muscle_gain_ratio_by_training_age() {
        let mut inputs = surplus_inputs();

        inputs.training_age = TrainingAge::Beginner;
        assert!(approx_eq(calculate_muscle_gain_ratio(&inputs).muscle_gain_ratio, 0.55, 1e-9));
        inputs.training_age = TrainingAge::Intermediate;
        assert!(approx_eq(calculate_muscle_gain_ratio(&inputs).muscle_gain_ratio, 0.40, 1e-9));
        inputs.training_age = TrainingAge::Advanced;
        assert!(approx_eq(calculate_muscle_gain_ratio(&inputs).muscle_gain_ratio, 0.30, 1e-9));
    }

    #[test]
    fn test_muscle_gain_ratio_multipliers() {
        let mut inputs = surplus_inputs();
        inputs.training_age = TrainingAge::Beginner;
        inputs.is_enhanced = true;
        inputs.avg_daily_protein_per_kg_bw = 2.2;
        inputs.avg_weekly_training_sets = 22.0;
        inputs.energy_balance_percent = 3.0;

        // min(0.75, 0.825) × 1.1 × 1.1 × 1.1 = 0.998 -> clamped to 0.80
        let gain = calculate_muscle_gain_ratio(&inputs);
        assert_eq!(gain.muscle_gain_ratio, MAX_MUSCLE_GAIN_RATIO);
        assert!(approx_eq(gain.confidence_range.low, 0.56, 1e-9));
        assert_eq!(gain.confidence_range.high, 0.85);
    }

    #[test]
    fn test_muscle_gain_enhanced_cap() {
        let mut inputs = surplus_inputs();
        inputs.training_age = TrainingAge::Beginner;
        inputs.is_enhanced = true;

        // 0.55 × 1.5 = 0.825, capped at 0.75 before the outer clamp at 0.80
        let gain = calculate_muscle_gain_ratio(&inputs);
        assert!(approx_eq(gain.muscle_gain_ratio, 0.75, 1e-9));
        assert!(approx_eq(gain.confidence_range.low, 0.525, 1e-9));
        assert_eq!(gain.confidence_range.high, 0.85);

        // Below the cap the enhanced multiplier applies in full
        inputs.training_age = TrainingAge::Advanced;
        let gain = calculate_muscle_gain_ratio(&inputs);
        assert!(approx_eq(gain.muscle_gain_ratio, 0.45, 1e-9));
    }

    #[test]
    fn test_gain_projection_uses_given_partitioning() {
        let inputs = surplus_inputs();
        let gain = calculate_muscle_gain_ratio(&inputs);

        let a = predict_weight_gain_composition(75.0, 80.0, 16.0, 178.0, &inputs).unwrap();
        let b = predict_weight_gain_from_partitioning(75.0, 80.0, 16.0, 178.0, &gain).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.p_ratio_used, gain.muscle_gain_ratio);

        assert!(predict_weight_gain_from_partitioning(80.0, 80.0, 16.0, 178.0, &gain).is_err());
    }

    #[test]
    fn test_muscle_gain_ratio_penalties() {
        let mut inputs = surplus_inputs();
        inputs.training_age = TrainingAge::Advanced;
        inputs.avg_daily_protein_per_kg_bw = 1.0;
        inputs.avg_weekly_training_sets = 3.0;
        inputs.energy_balance_percent = 25.0;

        // 0.30 × 0.85 × 0.5 × 0.85 = 0.108 -> clamped to 0.20
        let gain = calculate_muscle_gain_ratio(&inputs);
        assert_eq!(gain.muscle_gain_ratio, MIN_MUSCLE_GAIN_RATIO);
        assert!(approx_eq(gain.confidence_range.low, 0.14, 1e-9));
        assert!(approx_eq(gain.confidence_range.high, 0.26, 1e-9));
    }

    #[test]
    fn test_muscle_gain_moderate_inputs_unchanged() {
        // Protein 1.6, 14 sets, 10% surplus: no multiplier fires
        let gain = calculate_muscle_gain_ratio(&surplus_inputs());
        assert!(approx_eq(gain.muscle_gain_ratio, 0.40, 1e-9));
        assert!(approx_eq(gain.confidence_range.low, 0.28, 1e-9));
        assert!(approx_eq(gain.confidence_range.high, 0.52, 1e-9));
    }

    #[test]
    fn test_gain_expected_scenario_values() {
        // 70kg at 15% BF -> 10.5kg fat, 59.5kg lean. Gain 5kg at 0.40 muscle:
        // lean 61.5kg, fat 13.5kg, BF% = 13.5 / 75 = 18%
        let projection =
            predict_weight_gain_composition(70.0, 75.0, 15.0, 175.0, &surplus_inputs()).unwrap();

        assert!(approx_eq(projection.body_fat_percent.expected, 18.0, 1e-9));
        let expected_ffmi = calculate_ffmi(61.5, 175.0).normalized_ffmi;
        assert!(approx_eq(projection.ffmi.expected, expected_ffmi, 1e-9));
        assert!(approx_eq(projection.p_ratio_used, 0.40, 1e-9));
    }

    #[test]
    fn test_gain_scenario_direction() {
        let projection =
            predict_weight_gain_composition(70.0, 76.0, 15.0, 175.0, &surplus_inputs()).unwrap();

        let ffmi = projection.ffmi;
        assert!(ffmi.pessimistic < ffmi.expected);
        assert!(ffmi.expected < ffmi.optimistic);

        let bf = projection.body_fat_percent;
        assert!(bf.pessimistic > bf.expected);
        assert!(bf.expected > bf.optimistic);
    }

    #[test]
    fn test_gain_confidence_always_low() {
        let mut inputs = surplus_inputs();
        for age in [
            TrainingAge::Beginner,
            TrainingAge::Intermediate,
            TrainingAge::Advanced,
        ] {
            for enhanced in [false, true] {
                inputs.training_age = age;
                inputs.is_enhanced = enhanced;
                let projection =
                    predict_weight_gain_composition(80.0, 84.0, 18.0, 180.0, &inputs).unwrap();
                assert_eq!(projection.confidence_level, ConfidenceLevel::Low);
                assert_eq!(projection.factors, vec![GAIN_PROJECTION_NOTE.to_string()]);
            }
        }
    }

    #[test]
    fn test_gain_rejects_loss_and_maintenance() {
        let inputs = surplus_inputs();
        assert_eq!(
            predict_weight_gain_composition(80.0, 75.0, 18.0, 180.0, &inputs).unwrap_err(),
            ProjectionError::NotAWeightGain {
                current_kg: 80.0,
                predicted_kg: 75.0
            }
        );
        assert!(predict_weight_gain_composition(80.0, 80.0, 18.0, 180.0, &inputs).is_err());
    }

    #[test]
    fn test_confidence_level_serializes_lowercase() {
        let json = serde_json::to_string(&ConfidenceLevel::Reasonable).unwrap();
        assert_eq!(json, "\"reasonable\"");
    }
}
