//! Personal calibration of the heuristic P-ratio.
//!
//! Ratios observed between a user's own scans are blended into the heuristic
//! estimate. How much they are trusted depends only on how many there are, and
//! that policy is a plain function so it can be swapped without touching the
//! rule ladder.

/// Maps a history sample count to a blend weight in `[0, 1]`, or `None` to skip blending.
pub type TrustPolicy = fn(usize) -> Option<f64>;

/// Default trust policy: 35% for one sample, 55% for two, 75% for three or more.
pub fn sample_count_trust(sample_count: usize) -> Option<f64> {
    match sample_count {
        0 => None,
        1 => Some(0.35),
        2 => Some(0.55),
        _ => Some(0.75),
    }
}

/// Outcome of blending the heuristic ratio with personal history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryBlend {
    /// Blended (unclamped) ratio.
    pub ratio: f64,
    /// Arithmetic mean of the personal ratios.
    pub personal_average: f64,
    pub sample_count: usize,
    /// Weight given to the personal average.
    pub weight: f64,
}

impl HistoryBlend {
    /// Human-readable factor line naming the sample count and weight.
    pub fn factor_message(&self) -> String {
        let plural = if self.sample_count == 1 { "" } else { "s" };
        format!(
            "Personal calibration: {} scan comparison{} (avg {:.2}) blended at {:.0}% weight",
            self.sample_count,
            plural,
            self.personal_average,
            self.weight * 100.0
        )
    }
}

/// Blends `heuristic_ratio` toward the mean of `history`.
///
/// Returns None when the history is empty or the policy declines to blend.
pub fn blend_with_history(
    heuristic_ratio: f64,
    history: &[f64],
    policy: TrustPolicy,
) -> Option<HistoryBlend> {
    let personal_average = mean(history)?;
    let weight = policy(history.len())?;

    let ratio = heuristic_ratio * (1.0 - weight) + personal_average * weight;

    log::debug!(
        "Personal calibration: n={}, avg={:.3}, w={:.2}, {:.3} -> {:.3}",
        history.len(),
        personal_average,
        weight,
        heuristic_ratio,
        ratio
    );

    Some(HistoryBlend {
        ratio,
        personal_average,
        sample_count: history.len(),
        weight,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
