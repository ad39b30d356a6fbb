//! UV index risk classification.
//! Bands follow the WHO guidance: 0-2 low, 3-7 moderate, 8+ high.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UvRiskLevel {
    Unknown,
    Low,
    Moderate,
    High,
}

impl UvRiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    /// Recommended behaviour for this risk level.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unknown => "The exposure risk cannot be determined.",
            Self::Low => "You can safely enjoy being outside.",
            Self::Moderate => {
                "Seek shade during midday hours. Slip on a shirt, slop on sunscreen and slap on a hat."
            }
            Self::High => {
                "Avoid being outside during midday hours. Make sure you seek shade. Shirt, sunscreen and hat are a must."
            }
        }
    }
}

impl std::fmt::Display for UvRiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a UV index. Negative or NaN input is `Unknown`.
pub fn classify_uv(index: f64) -> (UvRiskLevel, &'static str) {
    let level = if index.is_nan() || index < 0.0 {
        UvRiskLevel::Unknown
    } else if index < 3.0 {
        UvRiskLevel::Low
    } else if index <= 7.0 {
        UvRiskLevel::Moderate
    } else {
        UvRiskLevel::High
    };
    (level, level.description())
}
