//! Body composition formulas: lean mass, fat mass and FFMI.

/// Reference height (m) for the normalized FFMI.
const FFMI_REFERENCE_HEIGHT_M: f64 = 1.8;

/// FFMI points added per metre below the reference height.
const FFMI_HEIGHT_SLOPE: f64 = 6.1;

/// Fat-free mass index for one lean mass / height pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FfmiResult {
    /// Raw FFMI in kg/m².
    pub ffmi: f64,
    /// FFMI adjusted to the 1.8 m reference height.
    pub normalized_ffmi: f64,
}

/// Calculates Lean Body Mass from bodyweight and body fat percentage.
///
/// Formula:
/// ```text
/// LBM = bodyweight × (1 - BF% / 100)
/// ```
pub fn calculate_lbm(bodyweight_kg: f64, body_fat_pct: f64) -> f64 {
    bodyweight_kg * (1.0 - body_fat_pct / 100.0)
}

/// Calculates fat mass from bodyweight and body fat percentage.
pub fn calculate_fat_mass(bodyweight_kg: f64, body_fat_pct: f64) -> f64 {
    bodyweight_kg * body_fat_pct / 100.0
}

/// Calculates the fat-free mass index.
///
/// Formula (height in metres):
/// ```text
/// FFMI            = LBM / height²
/// normalized FFMI = FFMI + 6.1 × (1.8 - height)
/// ```
///
/// Returns zeros for a non-positive height rather than dividing by zero.
pub fn calculate_ffmi(lean_mass_kg: f64, height_cm: f64) -> FfmiResult {
    if height_cm <= 0.0 {
        return FfmiResult {
            ffmi: 0.0,
            normalized_ffmi: 0.0,
        };
    }

    let height_m = height_cm / 100.0;
    let ffmi = lean_mass_kg / (height_m * height_m);
    let normalized_ffmi = ffmi + FFMI_HEIGHT_SLOPE * (FFMI_REFERENCE_HEIGHT_M - height_m);

    FfmiResult {
        ffmi,
        normalized_ffmi,
    }
}
