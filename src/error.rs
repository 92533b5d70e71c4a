use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors raised by the dashboard core.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No valid {0} data available")]
    DataUnavailable(&'static str),

    #[error("Missing required feature: {0}")]
    MissingFeature(String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Model error: {0}")]
    Model(String),
}

impl DashboardError {
    pub fn load(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        DashboardError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
