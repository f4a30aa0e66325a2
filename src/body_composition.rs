//! Personal P-ratio history from consecutive DEXA scans.
//!
//! Each pair of scans that brackets a real weight loss yields one observed
//! P-ratio: the share of the lost weight that was fat. These observations feed
//! the personal calibration blend in [`crate::calibration`].

use serde::{Deserialize, Serialize};

use crate::domain::DexaScan;

/// Tunables for deriving personal ratios from scan pairs.
///
/// Scan noise is roughly a kilogram, so pairs with smaller changes say more
/// about the scanner than about the athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Most recent ratios kept (older ones are dropped).
    pub max_samples: usize,
    /// Minimum weight decrease between two scans (kg).
    pub min_weight_change_kg: f64,
    /// Minimum spacing between two scans (days).
    pub min_days_between_scans: i64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_samples: 5,
            min_weight_change_kg: 1.0,
            min_days_between_scans: 14,
        }
    }
}

/// Calculates the observed P-ratio between two scans.
///
/// Formula:
/// ```text
/// P = Δfat / Δweight, clamped to [0, 1]
/// ```
///
/// Returns None if the scans are out of order, the weight went up, or the
/// decrease is smaller than `min_weight_change_kg`.
pub fn calculate_scan_p_ratio(
    before: &DexaScan,
    after: &DexaScan,
    min_weight_change_kg: f64,
) -> Option<f64> {
    if after.date <= before.date {
        return None;
    }

    let weight_change = after.weight_kg - before.weight_kg;
    if weight_change >= 0.0 || weight_change.abs() < min_weight_change_kg {
        return None;
    }

    let fat_change = after.fat_mass_kg - before.fat_mass_kg;
    Some((fat_change / weight_change).clamp(0.0, 1.0))
}

/// Derives the personal P-ratio history from a set of scans.
///
/// Scans are sorted by date and each consecutive pair that qualifies under
/// `config` contributes one ratio. At most `config.max_samples` of the most
/// recent ratios are returned, oldest first.
pub fn personal_p_ratio_history(scans: &[DexaScan], config: &CalibrationConfig) -> Vec<f64> {
    let mut sorted: Vec<&DexaScan> = scans.iter().collect();
    sorted.sort_by_key(|s| s.date);

    let mut ratios = Vec::new();

    for pair in sorted.windows(2) {
        let (before, after) = (pair[0], pair[1]);

        let days = (after.date - before.date).num_days();
        if days < config.min_days_between_scans {
            log::warn!(
                "Skipping scan pair {} -> {}: only {} days apart",
                before.date,
                after.date,
                days
            );
            continue;
        }

        match calculate_scan_p_ratio(before, after, config.min_weight_change_kg) {
            Some(ratio) => {
                log::debug!(
                    "Scan pair {} ({:.1}% BF) -> {} ({:.1}% BF): P-ratio {:.2}",
                    before.date,
                    before.body_fat_percent(),
                    after.date,
                    after.body_fat_percent(),
                    ratio
                );
                ratios.push(ratio);
            }
            None => log::debug!(
                "Scan pair {} -> {} is not a qualifying weight loss",
                before.date,
                after.date
            ),
        }
    }

    if ratios.len() > config.max_samples {
        let excess = ratios.len() - config.max_samples;
        return ratios.split_off(excess);
    }

    ratios
}
