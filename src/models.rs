use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity assigned to every record at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryRecord {
    pub id: RecordId,
    pub player: String,
    pub injury_date: NaiveDate,
    pub injury_type: String,
    pub body_part: String,
    pub severity: String,
    pub recovery_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleAssessmentRecord {
    pub id: RecordId,
    pub player: String,
    pub recorded_on: NaiveDate,
    pub hq_ratio: f64,
    pub quad_imbalance: f64,
    pub hamstring_imbalance: f64,
    pub calf_imbalance: f64,
    pub groin_imbalance: f64,
}

impl MuscleAssessmentRecord {
    pub fn imbalances(&self) -> [f64; 4] {
        [
            self.quad_imbalance,
            self.hamstring_imbalance,
            self.calf_imbalance,
            self.groin_imbalance,
        ]
    }

    pub fn metric(&self, metric: MuscleMetric) -> f64 {
        match metric {
            MuscleMetric::HqRatio => self.hq_ratio,
            MuscleMetric::QuadImbalance => self.quad_imbalance,
            MuscleMetric::HamstringImbalance => self.hamstring_imbalance,
            MuscleMetric::CalfImbalance => self.calf_imbalance,
            MuscleMetric::GroinImbalance => self.groin_imbalance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub id: RecordId,
    pub player: String,
    pub session_date: NaiveDate,
    pub duration_minutes: f64,
    pub trimp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    pub id: RecordId,
    pub shooter: String,
    pub game_date: NaiveDate,
    pub points: f64,
    /// Fraction of shots made, 0..=1.
    pub shot_accuracy: f64,
    pub shots_attempted: f64,
}

/// The five measurements carried by a muscle assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MuscleMetric {
    HqRatio,
    QuadImbalance,
    HamstringImbalance,
    CalfImbalance,
    GroinImbalance,
}

impl MuscleMetric {
    pub const ALL: [MuscleMetric; 5] = [
        MuscleMetric::HqRatio,
        MuscleMetric::QuadImbalance,
        MuscleMetric::HamstringImbalance,
        MuscleMetric::CalfImbalance,
        MuscleMetric::GroinImbalance,
    ];

    /// The metrics a muscle tab selection may name.
    pub const IMBALANCES: [MuscleMetric; 4] = [
        MuscleMetric::QuadImbalance,
        MuscleMetric::HamstringImbalance,
        MuscleMetric::CalfImbalance,
        MuscleMetric::GroinImbalance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MuscleMetric::HqRatio => "Hamstring To Quad Ratio",
            MuscleMetric::QuadImbalance => "Quad Imbalance Percent",
            MuscleMetric::HamstringImbalance => "HamstringImbalance Percent",
            MuscleMetric::CalfImbalance => "Calf Imbalance Percent",
            MuscleMetric::GroinImbalance => "Groin Imbalance Percent",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|metric| metric.label().eq_ignore_ascii_case(wanted))
    }

    /// Inclusive ideal band for the metric.
    pub fn ideal_band(&self) -> (f64, f64) {
        match self {
            MuscleMetric::HqRatio => (0.6, 0.8),
            _ => (-5.0, 5.0),
        }
    }
}

impl fmt::Display for MuscleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A labelled count, used for distributions such as severity or attendance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// A time bucket and the number of records falling inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodCount {
    pub period_start: NaiveDate,
    pub count: usize,
}
