use serde::{Deserialize, Serialize};

/// One nutrient/environment measurement.
///
/// Fields are stored exactly as entered or received. Range handling happens
/// only inside the score engine, so out-of-range values are legal here.
/// Missing fields in a decoded payload default to zero, except `ph` which
/// defaults to neutral 7.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Nitrogen, mg/kg
    #[serde(default)]
    pub n: f64,
    /// Phosphorus, mg/kg
    #[serde(default)]
    pub p: f64,
    /// Potassium, mg/kg
    #[serde(default)]
    pub k: f64,
    /// Air temperature, °C
    #[serde(default)]
    pub temp: f64,
    /// Relative humidity, %
    #[serde(default)]
    pub humidity: f64,
    #[serde(default = "neutral_ph")]
    pub ph: f64,
    /// Rainfall, mm
    #[serde(default)]
    pub rainfall: f64,
}

fn neutral_ph() -> f64 {
    7.0
}

impl SensorReading {
    /// Reading shown when a session starts with nothing configured.
    pub fn session_default() -> Self {
        Self {
            n: 40.0,
            p: 50.0,
            k: 30.0,
            temp: 28.0,
            humidity: 70.0,
            ph: 6.5,
            rainfall: 120.0,
        }
    }

    pub fn get(&self, field: SensorField) -> f64 {
        match field {
            SensorField::N => self.n,
            SensorField::P => self.p,
            SensorField::K => self.k,
            SensorField::Temp => self.temp,
            SensorField::Humidity => self.humidity,
            SensorField::Ph => self.ph,
            SensorField::Rainfall => self.rainfall,
        }
    }

    pub fn set(&mut self, field: SensorField, value: f64) {
        match field {
            SensorField::N => self.n = value,
            SensorField::P => self.p = value,
            SensorField::K => self.k = value,
            SensorField::Temp => self.temp = value,
            SensorField::Humidity => self.humidity = value,
            SensorField::Ph => self.ph = value,
            SensorField::Rainfall => self.rainfall = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    N,
    P,
    K,
    Temp,
    Humidity,
    Ph,
    Rainfall,
}

impl SensorField {
    /// Form order.
    pub const ALL: [SensorField; 7] = [
        SensorField::N,
        SensorField::P,
        SensorField::K,
        SensorField::Temp,
        SensorField::Humidity,
        SensorField::Ph,
        SensorField::Rainfall,
    ];

    /// Wire name, as used in the JSON body.
    pub fn key(&self) -> &'static str {
        match self {
            SensorField::N => "n",
            SensorField::P => "p",
            SensorField::K => "k",
            SensorField::Temp => "temp",
            SensorField::Humidity => "humidity",
            SensorField::Ph => "ph",
            SensorField::Rainfall => "rainfall",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorField::N => "Nitrogen",
            SensorField::P => "Phosphorus",
            SensorField::K => "Potassium",
            SensorField::Temp => "Temp",
            SensorField::Humidity => "Humidity",
            SensorField::Ph => "pH",
            SensorField::Rainfall => "Rainfall",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorField::N | SensorField::P | SensorField::K => "mg/kg",
            SensorField::Temp => "°C",
            SensorField::Humidity => "%",
            SensorField::Ph => "",
            SensorField::Rainfall => "mm",
        }
    }

    /// Display precision for the form and stat cards.
    pub fn precision(&self) -> usize {
        match self {
            SensorField::Ph => 1,
            _ => 0,
        }
    }

    pub fn next(&self) -> Self {
        let idx = self.index();
        SensorField::ALL[(idx + 1) % SensorField::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = self.index();
        SensorField::ALL[(idx + SensorField::ALL.len() - 1) % SensorField::ALL.len()]
    }

    fn index(&self) -> usize {
        SensorField::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for SensorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Best-effort numeric coercion for free-form input.
///
/// Blank input is zero, as is anything that does not parse to a finite number.
pub fn coerce_numeric(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
