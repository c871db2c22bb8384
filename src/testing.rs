//! Stub artifacts shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::artifacts::{ModelArtifacts, Regressor, Scaler};
use crate::error::PredictionInputError;

pub struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionInputError> {
        Ok(features.to_vec())
    }
}

pub struct ConstantRegressor(pub f64);

impl Regressor for ConstantRegressor {
    fn predict(&self, _features: &[f64]) -> Result<f64, PredictionInputError> {
        Ok(self.0)
    }
}

/// gpa = intercept + slope * study_time
pub struct StudyTimeRegressor {
    pub intercept: f64,
    pub slope: f64,
}

impl Regressor for StudyTimeRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionInputError> {
        Ok(self.intercept + self.slope * features[0])
    }
}

pub struct FailingRegressor;

impl Regressor for FailingRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionInputError> {
        Err(PredictionInputError::FeatureCount {
            expected: 9,
            found: features.len(),
        })
    }
}

/// Records how many times the model was asked.
pub struct CountingRegressor {
    pub calls: Arc<AtomicUsize>,
    pub value: f64,
}

impl Regressor for CountingRegressor {
    fn predict(&self, _features: &[f64]) -> Result<f64, PredictionInputError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

pub fn constant(gpa: f64) -> ModelArtifacts {
    ModelArtifacts::new(Box::new(IdentityScaler), Box::new(ConstantRegressor(gpa)))
}

pub fn linear(intercept: f64, slope: f64) -> ModelArtifacts {
    ModelArtifacts::new(
        Box::new(IdentityScaler),
        Box::new(StudyTimeRegressor { intercept, slope }),
    )
}

pub fn failing() -> ModelArtifacts {
    ModelArtifacts::new(Box::new(IdentityScaler), Box::new(FailingRegressor))
}

pub const SCALER_JSON: &str = r#"{
  "mean": [10.0, 5.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0],
  "scale": [5.0, 5.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
}"#;

pub const MODEL_JSON: &str = r#"{
  "n_neighbors": 2,
  "weights": "uniform",
  "samples": [
    [2.0, -1.0, 1.0, 2.0, 1.0, 0.0, 0.0, -1.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-2.0, 2.0, 0.0, -1.0, 0.0, 0.0, 0.0, 2.0],
    [2.2, -0.8, 1.0, 2.0, 1.0, 1.0, 0.0, -1.0]
  ],
  "targets": [3.8, 2.6, 1.2, 3.6]
}"#;
