//! Severity classification for AQI indices and pollutant concentrations.
//!
//! Pure lookups over static tables; nothing here can fail.

use serde::Serialize;

use crate::model::Pollutant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Good => "Good",
            Severity::Fair => "Fair",
            Severity::Moderate => "Moderate",
            Severity::Poor => "Poor",
            Severity::VeryPoor => "Very Poor",
            Severity::Unknown => "Unknown",
        }
    }

    /// Display color as a hex token.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Good => "#4CAF50",
            Severity::Fair => "#FFEB3B",
            Severity::Moderate => "#FFC107",
            Severity::Poor => "#FF5722",
            Severity::VeryPoor => "#F44336",
            Severity::Unknown => "#9E9E9E",
        }
    }
}

/// Indexed by `aqi - 1`.
const AQI_TABLE: [Severity; 5] = [
    Severity::Good,
    Severity::Fair,
    Severity::Moderate,
    Severity::Poor,
    Severity::VeryPoor,
];

/// Upper bounds (µg/m³, inclusive) of tiers 1 to 4; anything above is tier 5.
const BREAKPOINTS: [(Pollutant, [f64; 4]); 6] = [
    (Pollutant::So2, [20.0, 80.0, 250.0, 350.0]),
    (Pollutant::No2, [40.0, 70.0, 150.0, 200.0]),
    (Pollutant::Pm10, [20.0, 50.0, 100.0, 200.0]),
    (Pollutant::Pm2_5, [10.0, 25.0, 50.0, 75.0]),
    (Pollutant::O3, [60.0, 100.0, 140.0, 180.0]),
    (Pollutant::Co, [4400.0, 9400.0, 12400.0, 15400.0]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityInfo {
    pub severity: Severity,
    pub label: &'static str,
    pub color: &'static str,
}

impl From<Severity> for SeverityInfo {
    fn from(severity: Severity) -> Self {
        Self { severity, label: severity.label(), color: severity.color() }
    }
}

/// Maps an upstream AQI index to its severity. Anything outside 1..=5 is
/// `Unknown`.
pub fn aqi_severity(index: i64) -> SeverityInfo {
    let severity = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| AQI_TABLE.get(i).copied())
        .unwrap_or(Severity::Unknown);

    severity.into()
}

impl Pollutant {
    pub fn breakpoints(&self) -> [f64; 4] {
        BREAKPOINTS
            .iter()
            .find(|(p, _)| p == self)
            .map(|(_, bounds)| *bounds)
            .unwrap_or([f64::INFINITY; 4])
    }

    /// Smallest tier whose upper breakpoint is not exceeded, or 5.
    pub fn level(&self, concentration: f64) -> u8 {
        self.breakpoints()
            .iter()
            .position(|bound| concentration <= *bound)
            .map_or(5, |i| i as u8 + 1)
    }
}

/// Tier (1..=5) of a concentration for the pollutant named by `symbol`.
///
/// Symbols without a breakpoint table (e.g. "nh3") are reported as tier 1.
pub fn pollutant_level(symbol: &str, concentration: f64) -> u8 {
    match Pollutant::from_symbol(symbol) {
        Some(pollutant) => pollutant.level(concentration),
        None => 1,
    }
}

/// A pollutant tier rendered through the AQI severity table.
pub fn pollutant_severity(symbol: &str, concentration: f64) -> SeverityInfo {
    aqi_severity(i64::from(pollutant_level(symbol, concentration)))
}
