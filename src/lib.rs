//! Team health analytics: injury history, muscle imbalance, training
//! sessions and shooting performance, plus risk classification of
//! pre-trained model output.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod predict;
pub mod report;
pub mod risk;

pub use error::{DashboardError, Result};
