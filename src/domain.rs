//! Domain types for partitioning inputs and body composition snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How long the athlete has been training seriously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingAge {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl TrainingAge {
    /// Returns the display name for the training age.
    pub fn display_name(&self) -> &'static str {
        match self {
            TrainingAge::Beginner => "Beginner",
            TrainingAge::Intermediate => "Intermediate",
            TrainingAge::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for TrainingAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    #[default]
    Male,
    Female,
}

impl std::fmt::Display for BiologicalSex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BiologicalSex::Male => write!(f, "Male"),
            BiologicalSex::Female => write!(f, "Female"),
        }
    }
}

/// Physiological and behavioral inputs for one partitioning calculation.
///
/// Raw values are trusted as given. Only the derived ratios are clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitioningInputs {
    pub avg_daily_protein_grams: f64,
    pub avg_daily_protein_per_kg_bw: f64,
    /// Total working sets per week, summed across all trained muscles.
    pub avg_weekly_training_sets: f64,
    /// Informational only, the ratio math uses `energy_balance_percent`.
    #[serde(default)]
    pub avg_daily_deficit_cals: f64,
    /// Signed percentage of maintenance calories (negative = deficit, positive = surplus).
    pub energy_balance_percent: f64,
    pub current_body_fat_percent: f64,
    pub current_lean_mass_kg: f64,
    #[serde(default)]
    pub training_age: TrainingAge,
    #[serde(default)]
    pub is_enhanced: bool,
    #[serde(default)]
    pub biological_sex: BiologicalSex,
    #[serde(default)]
    pub chronological_age: Option<f64>,
    /// Fat fractions (0-1) observed between the user's own prior scans.
    #[serde(default)]
    pub personal_p_ratio_history: Vec<f64>,
}

impl PartitioningInputs {
    /// Returns true if the inputs describe a caloric deficit.
    pub fn is_deficit(&self) -> bool {
        self.energy_balance_percent < 0.0
    }

    /// Magnitude of the energy balance, regardless of sign.
    pub fn energy_balance_magnitude(&self) -> f64 {
        self.energy_balance_percent.abs()
    }

    /// Returns true if personal calibration data is available.
    pub fn has_personal_history(&self) -> bool {
        !self.personal_p_ratio_history.is_empty()
    }
}

/// A single DEXA measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexaScan {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub fat_mass_kg: f64,
    pub lean_mass_kg: f64,
}

impl DexaScan {
    /// Body fat percentage implied by the scan.
    pub fn body_fat_percent(&self) -> f64 {
        if self.weight_kg <= 0.0 {
            return 0.0;
        }
        self.fat_mass_kg / self.weight_kg * 100.0
    }
}
