//! Threshold classification of raw sensor readings.
//!
//! Pure functions only: classification maps a `(metric, value)` pair to a
//! discrete band with no network or rendering dependency, so it can be
//! tested and benchmarked in isolation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete safety band for a classified reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    Good,
    Warning,
    Critical,
}

impl Band {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Band::Good => "OK",
            Band::Warning => "WARN",
            Band::Critical => "CRIT",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The three water quality metrics carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Turbidity in NTU
    Turbidity,
    /// pH level
    Ph,
    /// Total dissolved solids in ppm
    Tds,
}

impl Metric {
    /// Display label including the measurement unit.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Turbidity => "Turbidity (NTU)",
            Metric::Ph => "pH Level",
            Metric::Tds => "TDS (ppm)",
        }
    }

    /// Human-readable hint describing the acceptable range.
    pub fn threshold_hint(&self) -> &'static str {
        match self {
            Metric::Turbidity => "EPA recommends < 5 NTU",
            Metric::Ph => "EPA recommends 6.5 to 8.5",
            Metric::Tds => "< 300 ppm good, 300-500 ppm fair, >= 500 ppm poor",
        }
    }
}

/// Classify a raw reading into its safety band.
///
/// Total over the reals: NaN classifies as `Critical` for every metric
/// rather than falling through a numeric comparison. Boundary values are
/// exact — turbidity `5.0` is `Critical`, TDS `300.0` is `Warning` and
/// `500.0` is `Critical`.
pub fn classify(metric: Metric, value: f64) -> Band {
    if value.is_nan() {
        return Band::Critical;
    }
    match metric {
        Metric::Turbidity => {
            if value < 5.0 {
                Band::Good
            } else {
                Band::Critical
            }
        }
        Metric::Ph => {
            if (6.5..=8.5).contains(&value) {
                Band::Good
            } else {
                Band::Critical
            }
        }
        Metric::Tds => {
            if value < 300.0 {
                Band::Good
            } else if value < 500.0 {
                Band::Warning
            } else {
                Band::Critical
            }
        }
    }
}
