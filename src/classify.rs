use std::fmt;

use serde::Serialize;

use crate::error::{DashboardError, Result};

/// Upper bounds (inclusive) of the first four tiers, in percent.
pub const TIER_BREAKPOINTS: [f64; 4] = [20.0, 40.0, 60.0, 80.0];
pub const HIGH_RISK_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::VeryLow,
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::VeryHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::VeryLow => "Very Low",
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskTier::VeryLow => {
                "Player is in a safe training zone. Continue with the current approach."
            }
            RiskTier::Low => "Maintain current load and keep monitoring recovery markers.",
            RiskTier::Moderate => {
                "Review recent training load and add targeted prevention work."
            }
            RiskTier::High => {
                "Consider reducing training intensity and implementing preventive measures."
            }
            RiskTier::VeryHigh => {
                "Restrict high-intensity work and refer the player for a medical assessment."
            }
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskStatus {
    HighRisk,
    LowRisk,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::HighRisk => f.write_str("High Risk"),
            RiskStatus::LowRisk => f.write_str("Low Risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub probability_percent: f64,
    pub tier: RiskTier,
    pub recommendation: &'static str,
    pub status: RiskStatus,
    /// Distance from the decision boundary: 0 at 50%, 100 at 0% or 100%.
    pub confidence: f64,
}

/// Maps a probability in percent onto a tier, status and confidence.
pub fn classify(probability_percent: f64) -> Result<Classification> {
    if !(0.0..=100.0).contains(&probability_percent) {
        return Err(DashboardError::Precondition(format!(
            "probability {probability_percent} is outside [0, 100]"
        )));
    }

    let tier = tier_for(probability_percent);
    let status = if probability_percent >= HIGH_RISK_PERCENT {
        RiskStatus::HighRisk
    } else {
        RiskStatus::LowRisk
    };

    Ok(Classification {
        probability_percent,
        tier,
        recommendation: tier.recommendation(),
        status,
        confidence: (probability_percent - HIGH_RISK_PERCENT).abs() * 2.0,
    })
}

fn tier_for(probability_percent: f64) -> RiskTier {
    TIER_BREAKPOINTS
        .iter()
        .position(|upper| probability_percent <= *upper)
        .map(|index| RiskTier::ALL[index])
        .unwrap_or(RiskTier::VeryHigh)
}

/// Converts a model probability in [0, 1] to percent.
pub fn probability_to_percent(probability: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(DashboardError::Precondition(format!(
            "model probability {probability} is outside [0, 1]"
        )));
    }
    Ok(probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_are_right_inclusive() {
        assert_eq!(classify(0.0).unwrap().tier, RiskTier::VeryLow);
        assert_eq!(classify(20.0).unwrap().tier, RiskTier::VeryLow);
        assert_eq!(classify(20.0001).unwrap().tier, RiskTier::Low);
        assert_eq!(classify(40.0).unwrap().tier, RiskTier::Low);
        assert_eq!(classify(59.9).unwrap().tier, RiskTier::Moderate);
        assert_eq!(classify(80.0).unwrap().tier, RiskTier::High);
        assert_eq!(classify(80.5).unwrap().tier, RiskTier::VeryHigh);
        assert_eq!(classify(100.0).unwrap().tier, RiskTier::VeryHigh);
    }

    #[test]
    fn status_flips_at_fifty() {
        assert_eq!(classify(49.99).unwrap().status, RiskStatus::LowRisk);
        assert_eq!(classify(50.0).unwrap().status, RiskStatus::HighRisk);
        assert_eq!(RiskStatus::HighRisk.to_string(), "High Risk");
    }

    #[test]
    fn confidence_measures_distance_from_boundary() {
        assert_eq!(classify(50.0).unwrap().confidence, 0.0);
        assert_eq!(classify(0.0).unwrap().confidence, 100.0);
        assert_eq!(classify(100.0).unwrap().confidence, 100.0);
        assert_eq!(classify(75.0).unwrap().confidence, 50.0);
    }

    #[test]
    fn each_tier_has_its_own_recommendation() {
        let mut seen: Vec<&str> = RiskTier::ALL.iter().map(|t| t.recommendation()).collect();
        seen.dedup();
        assert_eq!(seen.len(), 5);
        assert_eq!(
            classify(90.0).unwrap().recommendation,
            RiskTier::VeryHigh.recommendation()
        );
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        assert!(matches!(classify(-0.1), Err(DashboardError::Precondition(_))));
        assert!(classify(100.01).is_err());
        assert!(classify(f64::NAN).is_err());
    }

    #[test]
    fn converts_model_output_to_percent() {
        assert_eq!(probability_to_percent(0.25).unwrap(), 25.0);
        assert!(probability_to_percent(1.2).is_err());
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(RiskTier::VeryLow < RiskTier::Low);
        assert!(RiskTier::High < RiskTier::VeryHigh);
    }
}
