use std::collections::HashMap;

use crate::error::{DashboardError, Result};
use crate::models::{MuscleAssessmentRecord, RecordId};

pub const HQ_RATIO_MIN: f64 = 0.6;
pub const HQ_RATIO_MAX: f64 = 0.8;
pub const HQ_RATIO_WEIGHT: f64 = 10.0;
pub const IMBALANCE_TOLERANCE: f64 = 5.0;
pub const IMBALANCE_WEIGHT: f64 = 0.5;

/// Composite injury-risk score for one muscle assessment. Zero when every
/// metric sits inside its ideal band, unbounded above.
pub fn score(record: &MuscleAssessmentRecord) -> Result<f64> {
    if !record.hq_ratio.is_finite() || record.imbalances().iter().any(|v| !v.is_finite()) {
        return Err(DashboardError::Precondition(format!(
            "assessment {} for {} has a non-numeric metric",
            record.id, record.player
        )));
    }

    let mut total = ratio_penalty(record.hq_ratio);
    for imbalance in record.imbalances() {
        total += imbalance_penalty(imbalance);
    }
    Ok(total)
}

pub fn ratio_penalty(ratio: f64) -> f64 {
    if ratio < HQ_RATIO_MIN {
        (HQ_RATIO_MIN - ratio) * HQ_RATIO_WEIGHT
    } else if ratio > HQ_RATIO_MAX {
        (ratio - HQ_RATIO_MAX) * HQ_RATIO_WEIGHT
    } else {
        0.0
    }
}

pub fn imbalance_penalty(percent: f64) -> f64 {
    let magnitude = percent.abs();
    if magnitude > IMBALANCE_TOLERANCE {
        (magnitude - IMBALANCE_TOLERANCE) * IMBALANCE_WEIGHT
    } else {
        0.0
    }
}

/// Risk scores keyed by record identity. Source records stay untouched.
#[derive(Debug, Clone, Default)]
pub struct RiskScores {
    scores: HashMap<RecordId, f64>,
}

impl RiskScores {
    pub fn get(&self, id: RecordId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.values().copied()
    }

    /// Scores strictly above `cutoff`.
    pub fn high_risk_count(&self, cutoff: f64) -> usize {
        self.values().filter(|score| *score > cutoff).count()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.scores.len() as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }
}

pub fn score_all(records: &[MuscleAssessmentRecord]) -> Result<RiskScores> {
    let mut scores = HashMap::with_capacity(records.len());
    for record in records {
        scores.insert(record.id, score(record)?);
    }
    Ok(RiskScores { scores })
}
