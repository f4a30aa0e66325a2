//! Weight-loss partitioning ratio (P-ratio).
//!
//! The P-ratio is the fraction of a weight decrease that comes from fat mass.
//! It starts at a fixed baseline and is shifted by an ordered table of rules,
//! each of which may or may not leave an explanation behind. The explanations
//! are shown to users in the order the rules ran, so the table order matters.

use serde::{Deserialize, Serialize};

use crate::calibration::{TrustPolicy, blend_with_history, sample_count_trust};
use crate::domain::{BiologicalSex, PartitioningInputs, TrainingAge};

// === Constants ===

/// Starting P-ratio before any rule fires.
pub const BASELINE_P_RATIO: f64 = 0.75;

/// Lower clamp for the P-ratio and its confidence bounds.
pub const MIN_P_RATIO: f64 = 0.40;

/// Upper clamp for the P-ratio and its confidence bounds.
pub const MAX_P_RATIO: f64 = 0.95;

/// Half-width of the confidence band when personal history was blended in.
const CALIBRATED_UNCERTAINTY: f64 = 0.08;

/// Half-width of the confidence band for the heuristic alone.
const HEURISTIC_UNCERTAINTY: f64 = 0.15;

// === Data Structures ===

/// Closed interval of ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub low: f64,
    pub high: f64,
}

impl RatioRange {
    /// Width of the interval.
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Result of the loss-side partitioning calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossPartitioning {
    /// Fraction of the weight change that is fat, in `[0.40, 0.95]`.
    pub final_p_ratio: f64,
    pub confidence_range: RatioRange,
    /// Explanations for each logged adjustment, in application order.
    pub factors: Vec<String>,
}

/// A single shift of the P-ratio.
///
/// `message` is None for adjustments that change the ratio without being reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub delta: f64,
    pub message: Option<String>,
}

impl Adjustment {
    fn logged(delta: f64, message: String) -> Self {
        Self {
            delta,
            message: Some(message),
        }
    }

    fn silent(delta: f64) -> Self {
        Self {
            delta,
            message: None,
        }
    }
}

/// One entry of the rule ladder. `evaluate` returns None when the rule does not fire.
#[derive(Clone, Copy)]
pub struct PartitioningRule {
    pub name: &'static str,
    pub evaluate: fn(&PartitioningInputs) -> Option<Adjustment>,
}

/// The loss-side rule ladder, in application order.
pub const LOSS_RULES: &[PartitioningRule] = &[
    PartitioningRule {
        name: "body_fat",
        evaluate: body_fat_rule,
    },
    PartitioningRule {
        name: "protein",
        evaluate: protein_rule,
    },
    PartitioningRule {
        name: "training_volume",
        evaluate: training_volume_rule,
    },
    PartitioningRule {
        name: "energy_deficit",
        evaluate: energy_deficit_rule,
    },
    PartitioningRule {
        name: "training_age",
        evaluate: training_age_rule,
    },
    PartitioningRule {
        name: "enhanced",
        evaluate: enhanced_rule,
    },
    PartitioningRule {
        name: "chronological_age",
        evaluate: chronological_age_rule,
    },
    PartitioningRule {
        name: "female_body_fat",
        evaluate: female_body_fat_rule,
    },
];

// === Rules ===

fn body_fat_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    let bf = inputs.current_body_fat_percent;
    if bf < 10.0 {
        Some(Adjustment::logged(
            -0.15,
            format!("Very low body fat ({:.1}%): high risk of lean mass loss", bf),
        ))
    } else if bf < 15.0 {
        Some(Adjustment::logged(
            -0.10,
            format!("Low body fat ({:.1}%): elevated risk of lean mass loss", bf),
        ))
    } else if bf > 25.0 {
        Some(Adjustment::logged(
            0.05,
            format!("Higher body fat ({:.1}%): more fat available to lose", bf),
        ))
    } else {
        None
    }
}

fn protein_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    let protein = inputs.avg_daily_protein_per_kg_bw;
    if protein >= 2.2 {
        Some(Adjustment::logged(
            0.08,
            format!("High protein intake ({:.1} g/kg): strong muscle protection", protein),
        ))
    } else if protein >= 1.8 {
        Some(Adjustment::logged(
            0.05,
            format!("Adequate protein intake ({:.1} g/kg): good muscle protection", protein),
        ))
    } else if protein >= 1.4 {
        None
    } else {
        Some(Adjustment::logged(
            -0.10,
            format!("Low protein intake ({:.1} g/kg): more muscle loss likely", protein),
        ))
    }
}

fn training_volume_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    let sets = inputs.avg_weekly_training_sets;
    if sets >= 20.0 {
        Some(Adjustment::logged(
            0.05,
            format!("High training volume ({:.0} sets/week): strong retention signal", sets),
        ))
    } else if sets >= 12.0 {
        None
    } else if sets >= 8.0 {
        Some(Adjustment::logged(
            -0.03,
            format!("Low training volume ({:.0} sets/week): weaker retention signal", sets),
        ))
    } else {
        Some(Adjustment::logged(
            -0.08,
            format!("Very low training volume ({:.0} sets/week): minimal retention signal", sets),
        ))
    }
}

/// Surpluses never fire here; gain partitioning has its own model.
fn energy_deficit_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    if !inputs.is_deficit() {
        return None;
    }

    let deficit = inputs.energy_balance_magnitude();
    if deficit > 30.0 {
        Some(Adjustment::logged(
            -0.12,
            format!("Aggressive deficit ({:.0}% below maintenance): accelerated muscle loss", deficit),
        ))
    } else if deficit >= 20.0 {
        Some(Adjustment::logged(
            -0.08,
            format!("Large deficit ({:.0}% below maintenance): increased muscle loss", deficit),
        ))
    } else if deficit >= 15.0 {
        Some(Adjustment::logged(
            -0.04,
            format!("Moderate deficit ({:.0}% below maintenance): some muscle loss", deficit),
        ))
    } else if deficit < 10.0 {
        Some(Adjustment::logged(
            0.03,
            format!("Conservative deficit ({:.0}% below maintenance): favors fat loss", deficit),
        ))
    } else {
        None
    }
}

fn training_age_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    match inputs.training_age {
        TrainingAge::Beginner => Some(Adjustment::logged(
            0.05,
            "Beginner: capacity to build muscle while losing fat".to_string(),
        )),
        TrainingAge::Advanced => Some(Adjustment::logged(
            -0.03,
            "Advanced lifter: muscle is harder to retain in a deficit".to_string(),
        )),
        TrainingAge::Intermediate => None,
    }
}

fn enhanced_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    inputs.is_enhanced.then(|| {
        Adjustment::logged(
            0.10,
            "Enhanced: pharmacological support for muscle retention".to_string(),
        )
    })
}

fn chronological_age_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    let age = inputs.chronological_age?;
    if age >= 50.0 {
        Some(Adjustment::logged(
            -0.05,
            format!("Age {:.0}: reduced muscle protein synthesis", age),
        ))
    } else if age >= 40.0 {
        Some(Adjustment::logged(
            -0.02,
            format!("Age {:.0}: slightly reduced muscle protein synthesis", age),
        ))
    } else {
        None
    }
}

/// Shifts the ratio without adding a factor line (see DESIGN.md).
fn female_body_fat_rule(inputs: &PartitioningInputs) -> Option<Adjustment> {
    (inputs.biological_sex == BiologicalSex::Female && inputs.current_body_fat_percent > 20.0)
        .then(|| Adjustment::silent(0.02))
}

// === Main Calculation Functions ===

/// Runs `rules` in order from the baseline, returning the unclamped ratio and the
/// messages of the adjustments that were logged.
pub fn apply_rules(inputs: &PartitioningInputs, rules: &[PartitioningRule]) -> (f64, Vec<String>) {
    let mut ratio = BASELINE_P_RATIO;
    let mut factors = Vec::new();

    for rule in rules {
        if let Some(adjustment) = (rule.evaluate)(inputs) {
            ratio += adjustment.delta;
            log::debug!(
                "P-ratio rule {}: {:+.2} -> {:.3}",
                rule.name,
                adjustment.delta,
                ratio
            );
            if let Some(message) = adjustment.message {
                factors.push(message);
            }
        }
    }

    (ratio, factors)
}

/// Calculates the loss-side P-ratio with the default personal-history trust policy.
pub fn calculate_p_ratio(inputs: &PartitioningInputs) -> LossPartitioning {
    calculate_p_ratio_with(inputs, sample_count_trust)
}

/// Calculates the loss-side P-ratio, blending personal history with `policy`.
pub fn calculate_p_ratio_with(inputs: &PartitioningInputs, policy: TrustPolicy) -> LossPartitioning {
    let (mut ratio, mut factors) = apply_rules(inputs, LOSS_RULES);

    let blend = blend_with_history(ratio, &inputs.personal_p_ratio_history, policy);
    if let Some(blend) = &blend {
        ratio = blend.ratio;
        factors.push(blend.factor_message());
    }

    let final_p_ratio = round_to_hundredths(clamp_p_ratio(ratio));

    let base_uncertainty = if blend.is_some() {
        CALIBRATED_UNCERTAINTY
    } else {
        HEURISTIC_UNCERTAINTY
    };
    let uncertainty = base_uncertainty * (1.0 + inputs.energy_balance_magnitude() / 100.0);

    let confidence_range = RatioRange {
        low: clamp_p_ratio(final_p_ratio - uncertainty),
        high: clamp_p_ratio(final_p_ratio + uncertainty),
    };

    log::debug!(
        "P-ratio {:.2} (range {:.3}-{:.3}, {} factors)",
        final_p_ratio,
        confidence_range.low,
        confidence_range.high,
        factors.len()
    );

    LossPartitioning {
        final_p_ratio,
        confidence_range,
        factors,
    }
}

// === Helper Functions ===

fn clamp_p_ratio(ratio: f64) -> f64 {
    ratio.clamp(MIN_P_RATIO, MAX_P_RATIO)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// === Unit Tests ===
