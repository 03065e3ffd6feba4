use super::sensor::SensorReading;
use serde::{Deserialize, Serialize};

/// Label given to snapshots of the reading that was just persisted.
pub const NOW_LABEL: &str = "Now";

/// Immutable chart point. Seed points carry no nutrient values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub label: String,
    pub temp: f64,
    pub humidity: f64,
    pub ph: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
}

impl HistoryPoint {
    pub fn new(label: impl Into<String>, temp: f64, humidity: f64, ph: f64) -> Self {
        Self {
            label: label.into(),
            temp,
            humidity,
            ph,
            n: None,
            p: None,
            k: None,
        }
    }

    pub fn snapshot(label: impl Into<String>, reading: &SensorReading) -> Self {
        Self {
            label: label.into(),
            temp: reading.temp,
            humidity: reading.humidity,
            ph: reading.ph,
            n: Some(reading.n),
            p: Some(reading.p),
            k: Some(reading.k),
        }
    }
}

/// Points shown on the trend chart before anything has been persisted.
pub fn seed_history() -> Vec<HistoryPoint> {
    vec![
        HistoryPoint::new("T-4", 26.0, 72.0, 6.7),
        HistoryPoint::new("T-3", 27.0, 70.0, 6.6),
        HistoryPoint::new("T-2", 28.0, 69.0, 6.5),
        HistoryPoint::new("T-1", 29.0, 68.0, 6.6),
    ]
}
