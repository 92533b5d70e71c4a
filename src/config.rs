use std::path::{Path, PathBuf};

use serde::Serialize;

pub const DEFAULT_MUSCLE_HIGH_RISK_CUTOFF: f64 = 10.0;
pub const DEFAULT_SESSION_RISK_QUANTILE: f64 = 0.75;
pub const DEFAULT_PLAYER_COUNT: usize = 3;

/// File names of the data sets inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFiles {
    pub injuries: String,
    pub muscle: String,
    pub sessions: String,
    pub performance: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        DataFiles {
            injuries: "injury_history(injury_history).csv".to_string(),
            muscle: "injury_history(muscle_imbalance_data).csv".to_string(),
            sessions: "injury_history(player_sessions).csv".to_string(),
            performance: "performance_data.csv".to_string(),
        }
    }
}

impl DataFiles {
    pub fn injuries_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.injuries)
    }

    pub fn muscle_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.muscle)
    }

    pub fn sessions_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.sessions)
    }

    pub fn performance_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.performance)
    }
}

/// Thresholds and defaults shared by every tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConfig {
    /// Muscle assessments scoring strictly above this are high risk.
    pub muscle_high_risk_cutoff: f64,
    /// Sessions whose trimp exceeds this quantile of the filtered set are high risk.
    pub session_risk_quantile: f64,
    /// How many players a tab selects when the user names none.
    pub default_player_count: usize,
    pub files: DataFiles,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            muscle_high_risk_cutoff: DEFAULT_MUSCLE_HIGH_RISK_CUTOFF,
            session_risk_quantile: DEFAULT_SESSION_RISK_QUANTILE,
            default_player_count: DEFAULT_PLAYER_COUNT,
            files: DataFiles::default(),
        }
    }
}
