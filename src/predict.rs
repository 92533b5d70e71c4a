//! Prediction requests and the pre-trained model interface.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{self, Classification};
use crate::error::{DashboardError, Result};

/// One input of a prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FeatureSpec {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

const fn feature(
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    default: f64,
) -> FeatureSpec {
    FeatureSpec {
        name,
        label,
        min,
        max,
        default,
    }
}

pub const INJURY_FEATURES: [FeatureSpec; 6] = [
    feature("Average_Recovery_Time", "Average Recovery Time (days)", 0.0, 60.0, 15.0),
    feature("Severity_Score", "Injury Severity Score", 0.0, 10.0, 5.0),
    feature("Baseline_Exertion", "Baseline Exertion Level", 0.0, 100.0, 50.0),
    feature("Muscle_Imbalance", "Muscle Imbalance Level", 0.0, 10.0, 5.0),
    feature("trimp", "TRIMP Score (Training Impulse)", 0.0, 300.0, 150.0),
    feature("Days_Since_Last_Injury", "Days Since Last Injury", 0.0, 365.0, 90.0),
];

pub const PERFORMANCE_FEATURES: [FeatureSpec; 12] = [
    feature("shooting_success_rate", "Shooting Success Rate", 0.0, 1.0, 0.5),
    feature("recent_performance", "Recent Performance", 0.0, 1.0, 0.5),
    feature("win_prob_gap", "Win Probability Gap", 0.0, 1.0, 0.1),
    feature("possession_length", "Possession Length", 0.0, 100.0, 30.0),
    feature("scoring_streak", "Scoring Streak", 0.0, 10.0, 0.0),
    feature("time_remaining", "Time Remaining", 0.0, 300.0, 120.0),
    feature("home_team_advantage", "Home Team Advantage", 0.0, 1.0, 0.0),
    feature("high_pressure", "High Pressure", 0.0, 1.0, 0.0),
    feature("possession_change", "Possession Change", 0.0, 1.0, 0.0),
    feature("5min_clutch_success_rate", "5-Min Clutch Success Rate", 0.0, 1.0, 0.5),
    feature("2min_clutch_success_rate", "2-Min Clutch Success Rate", 0.0, 1.0, 0.5),
    feature("final_shot_success_rate", "Final Shot Success Rate", 0.0, 1.0, 0.5),
];

/// A single model input row in the order the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub names: Vec<&'static str>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assembles named form inputs into a [`FeatureVector`]. Out-of-range values
/// are logged and kept; a missing input is an error, never silently defaulted.
#[derive(Debug, Clone, Copy)]
pub struct PredictionRequestBuilder {
    specs: &'static [FeatureSpec],
}

impl PredictionRequestBuilder {
    pub const fn new(specs: &'static [FeatureSpec]) -> Self {
        PredictionRequestBuilder { specs }
    }

    pub const fn injury() -> Self {
        Self::new(&INJURY_FEATURES)
    }

    pub const fn performance() -> Self {
        Self::new(&PERFORMANCE_FEATURES)
    }

    pub fn specs(&self) -> &'static [FeatureSpec] {
        self.specs
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &'static str> {
        self.specs.iter().map(|spec| spec.name)
    }

    /// The form's initial values.
    pub fn defaults(&self) -> HashMap<String, f64> {
        self.specs
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default))
            .collect()
    }

    pub fn build(&self, inputs: &HashMap<String, f64>) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            let value = inputs
                .get(spec.name)
                .copied()
                .ok_or_else(|| DashboardError::MissingFeature(spec.name.to_string()))?;
            if !spec.contains(value) {
                tracing::warn!(
                    feature = spec.name,
                    value,
                    min = spec.min,
                    max = spec.max,
                    "input outside the form range"
                );
            }
            values.push(value);
        }

        let unknown: Vec<&String> = inputs
            .keys()
            .filter(|name| !self.specs.iter().any(|spec| spec.name == name.as_str()))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(?unknown, "ignoring inputs the model does not use");
        }

        Ok(FeatureVector {
            names: self.feature_names().collect(),
            values,
        })
    }
}

/// A pre-trained binary classifier.
pub trait ProbabilityModel {
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class, in [0, 1].
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        Ok(u8::from(self.predict_proba(features)? >= 0.5))
    }

    /// Fails unless the model expects exactly the builder's feature order.
    fn ensure_compatible(&self, builder: &PredictionRequestBuilder) -> Result<()> {
        let expected: Vec<&str> = builder.feature_names().collect();
        let actual: Vec<&str> = self.feature_names().iter().map(String::as_str).collect();
        if expected != actual {
            return Err(DashboardError::Model(format!(
                "model features {actual:?} do not match the form order {expected:?}"
            )));
        }
        Ok(())
    }
}

/// Standardised logistic regression, serialised as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_means: Vec<f64>,
    #[serde(default)]
    pub feature_stds: Vec<f64>,
    pub coeffs: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| DashboardError::load(path, err))?;
        let model: LogisticModel =
            serde_json::from_str(&raw).map_err(|err| DashboardError::load(path, err))?;
        model.validate()?;
        tracing::info!(
            path = %path.display(),
            features = model.feature_names.len(),
            "loaded prediction model"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if self.coeffs.len() != n {
            return Err(DashboardError::Model(format!(
                "{} coefficients for {n} features",
                self.coeffs.len()
            )));
        }
        for (what, values) in [("means", &self.feature_means), ("stds", &self.feature_stds)] {
            if !values.is_empty() && values.len() != n {
                return Err(DashboardError::Model(format!(
                    "{} feature {what} for {n} features",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    fn standardized(&self, raw: f64, idx: usize) -> f64 {
        let mean = self.feature_means.get(idx).copied().unwrap_or(0.0);
        let std = self
            .feature_stds
            .get(idx)
            .copied()
            .unwrap_or(1.0)
            .max(1e-6);
        (raw - mean) / std
    }
}

impl ProbabilityModel for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.coeffs.len() {
            return Err(DashboardError::Model(format!(
                "expected {} features, got {}",
                self.coeffs.len(),
                features.len()
            )));
        }
        let z = features
            .values
            .iter()
            .enumerate()
            .fold(self.intercept, |acc, (idx, raw)| {
                acc + self.coeffs[idx] * self.standardized(*raw, idx)
            });
        Ok(logistic(z))
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryPrediction {
    pub features: FeatureVector,
    pub classification: Classification,
}

/// Runs the injury form through `model` and classifies the result.
pub fn predict_injury(
    model: &dyn ProbabilityModel,
    inputs: &HashMap<String, f64>,
) -> Result<InjuryPrediction> {
    let features = PredictionRequestBuilder::injury().build(inputs)?;
    let probability = model.predict_proba(&features)?;
    let classification = classify::classify(classify::probability_to_percent(probability)?)?;
    tracing::debug!(
        probability = classification.probability_percent,
        tier = %classification.tier,
        "classified injury risk"
    );
    Ok(InjuryPrediction {
        features,
        classification,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ShotRecommendation {
    Take { shooter: String },
    NoClearChoice,
}

/// Runs the shot-situation form through `model`; a positive label recommends `shooter`.
pub fn predict_performance(
    model: &dyn ProbabilityModel,
    inputs: &HashMap<String, f64>,
    shooter: &str,
) -> Result<ShotRecommendation> {
    let features = PredictionRequestBuilder::performance().build(inputs)?;
    let recommendation = if model.predict(&features)? == 1 {
        ShotRecommendation::Take {
            shooter: shooter.to_string(),
        }
    } else {
        ShotRecommendation::NoClearChoice
    };
    Ok(recommendation)
}
