use crate::models::SensorReading;

/// Nutrient concentration (mg/kg) at which N, P or K saturates.
pub const NUTRIENT_SATURATION: f64 = 120.0;
/// Temperature (°C) of peak suitability.
pub const IDEAL_TEMP_C: f64 = 28.0;
/// Distance from the ideal temperature at which the temperature score reaches zero.
pub const TEMP_TOLERANCE_C: f64 = 20.0;
pub const HUMIDITY_SATURATION: f64 = 100.0;
/// Soil pH of peak suitability.
pub const IDEAL_PH: f64 = 6.5;
pub const PH_TOLERANCE: f64 = 2.5;
/// Rainfall (mm) at which the rainfall score saturates.
pub const RAINFALL_SATURATION: f64 = 250.0;

/// Shared weight of the three nutrient sub-scores.
pub const NUTRIENT_WEIGHT: f64 = 0.45;
pub const TEMP_WEIGHT: f64 = 0.15;
pub const HUMIDITY_WEIGHT: f64 = 0.10;
pub const PH_WEIGHT: f64 = 0.15;
pub const RAINFALL_WEIGHT: f64 = 0.15;

/// Per-factor view of a score, each sub-score already clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl ScoreBreakdown {
    /// Weighted sum before scaling to percent. Can exceed 1.0 when nutrients saturate.
    pub fn combined(&self) -> f64 {
        (self.nitrogen + self.phosphorus + self.potassium) * NUTRIENT_WEIGHT
            + self.temperature * TEMP_WEIGHT
            + self.humidity * HUMIDITY_WEIGHT
            + self.ph * PH_WEIGHT
            + self.rainfall * RAINFALL_WEIGHT
    }

    /// Labelled weighted contributions in percentage points, for display.
    pub fn contributions(&self) -> [(&'static str, f64, f64); 7] {
        [
            ("Nitrogen", self.nitrogen, self.nitrogen * NUTRIENT_WEIGHT * 100.0),
            ("Phosphorus", self.phosphorus, self.phosphorus * NUTRIENT_WEIGHT * 100.0),
            ("Potassium", self.potassium, self.potassium * NUTRIENT_WEIGHT * 100.0),
            ("Temperature", self.temperature, self.temperature * TEMP_WEIGHT * 100.0),
            ("Humidity", self.humidity, self.humidity * HUMIDITY_WEIGHT * 100.0),
            ("pH", self.ph, self.ph * PH_WEIGHT * 100.0),
            ("Rainfall", self.rainfall, self.rainfall * RAINFALL_WEIGHT * 100.0),
        ]
    }
}

fn unit_clamp(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Linear ramp that peaks at `ideal` and reaches zero `tolerance` away from it.
fn peaked(value: f64, ideal: f64, tolerance: f64) -> f64 {
    unit_clamp(1.0 - (value - ideal).abs() / tolerance)
}

pub fn score_breakdown(reading: &SensorReading) -> ScoreBreakdown {
    ScoreBreakdown {
        nitrogen: unit_clamp(reading.n / NUTRIENT_SATURATION),
        phosphorus: unit_clamp(reading.p / NUTRIENT_SATURATION),
        potassium: unit_clamp(reading.k / NUTRIENT_SATURATION),
        temperature: peaked(reading.temp, IDEAL_TEMP_C, TEMP_TOLERANCE_C),
        humidity: unit_clamp(reading.humidity / HUMIDITY_SATURATION),
        ph: peaked(reading.ph, IDEAL_PH, PH_TOLERANCE),
        rainfall: unit_clamp(reading.rainfall / RAINFALL_SATURATION),
    }
}

/// Calculate the AgriScore (0-100) for a reading.
///
/// Every factor is clamped before the weighted combination; the rounded
/// percentage is then capped at 100 because the nutrient weight applies to
/// each of N, P and K. Total and deterministic: non-finite inputs score
/// their factor as zero.
pub fn compute_score(reading: &SensorReading) -> u8 {
    let percent = (score_breakdown(reading).combined() * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
