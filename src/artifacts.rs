use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, PredictionInputError};

/// Fitted transform from raw features into the space the regressor was trained on.
pub trait Scaler: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionInputError>;
}

/// Fitted model mapping a scaled feature vector to a GPA estimate.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionInputError>;
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), PredictionInputError> {
    if features.len() != expected {
        return Err(PredictionInputError::FeatureCount {
            expected,
            found: features.len(),
        });
    }
    if let Some(index) = features.iter().position(|value| !value.is_finite()) {
        return Err(PredictionInputError::NonFinite { index });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, path: &Path) -> Result<(), ArtifactLoadError> {
        let invalid = |reason: String| ArtifactLoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        if self.mean.is_empty() {
            return Err(invalid("scaler has no features".to_string()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(invalid(format!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(invalid("scaler contains non-finite values".to_string()));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionInputError> {
        check_width(self.mean.len(), features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| {
                // constant features were fitted with a zero spread
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    #[default]
    Uniform,
    Distance,
}

fn default_power() -> f64 {
    2.0
}

/// k-nearest-neighbors regressor carrying its full training set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnRegressor {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: Weighting,
    #[serde(default = "default_power")]
    pub p: f64,
    pub samples: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl KnnRegressor {
    pub fn feature_count(&self) -> usize {
        self.samples.first().map(Vec::len).unwrap_or(0)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactLoadError> {
        let invalid = |reason: String| ArtifactLoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        if self.samples.is_empty() {
            return Err(invalid("model has no training samples".to_string()));
        }
        if self.samples.len() != self.targets.len() {
            return Err(invalid(format!(
                "model has {} samples but {} targets",
                self.samples.len(),
                self.targets.len()
            )));
        }
        let width = self.feature_count();
        if width == 0 || self.samples.iter().any(|row| row.len() != width) {
            return Err(invalid("training samples have inconsistent widths".to_string()));
        }
        if self.n_neighbors == 0 || self.n_neighbors > self.samples.len() {
            return Err(invalid(format!(
                "n_neighbors must be within 1-{}, got {}",
                self.samples.len(),
                self.n_neighbors
            )));
        }
        if !self.p.is_finite() || self.p < 1.0 {
            return Err(invalid(format!("minkowski power must be >= 1, got {}", self.p)));
        }
        let non_finite = self
            .samples
            .iter()
            .flatten()
            .chain(&self.targets)
            .any(|v| !v.is_finite());
        if non_finite {
            return Err(invalid("model contains non-finite values".to_string()));
        }
        Ok(())
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if self.p == 2.0 {
            return a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt();
        }
        if self.p == 1.0 {
            return a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
        }
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs().powf(self.p))
            .sum::<f64>()
            .powf(1.0 / self.p)
    }
}

impl Regressor for KnnRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionInputError> {
        check_width(self.feature_count(), features)?;

        let mut neighbors: Vec<(f64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(index, row)| (self.distance(features, row), index))
            .collect();
        // stable: equal distances keep training order
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbors.truncate(self.n_neighbors);

        let estimate = match self.weights {
            Weighting::Uniform => {
                neighbors.iter().map(|(_, i)| self.targets[*i]).sum::<f64>()
                    / neighbors.len() as f64
            }
            Weighting::Distance => {
                let exact: Vec<f64> = neighbors
                    .iter()
                    .filter(|(d, _)| *d == 0.0)
                    .map(|(_, i)| self.targets[*i])
                    .collect();
                if !exact.is_empty() {
                    exact.iter().sum::<f64>() / exact.len() as f64
                } else {
                    let (weighted, total) = neighbors.iter().fold((0.0, 0.0), |acc, (d, i)| {
                        (acc.0 + self.targets[*i] / d, acc.1 + 1.0 / d)
                    });
                    weighted / total
                }
            }
        };

        if !estimate.is_finite() {
            return Err(PredictionInputError::Model(format!(
                "neighbor average is {estimate}"
            )));
        }
        Ok(estimate)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub scaler_features: usize,
    pub model_features: usize,
    pub training_rows: usize,
    pub n_neighbors: usize,
    pub weights: Weighting,
    pub p: f64,
}

/// The frozen scaler and regressor shared by every request.
pub struct ModelArtifacts {
    scaler: Box<dyn Scaler>,
    regressor: Box<dyn Regressor>,
    summary: Option<ArtifactSummary>,
}

impl ModelArtifacts {
    pub fn new(scaler: Box<dyn Scaler>, regressor: Box<dyn Regressor>) -> Self {
        Self {
            scaler,
            regressor,
            summary: None,
        }
    }

    pub fn from_fitted(scaler: StandardScaler, regressor: KnnRegressor) -> Self {
        let summary = ArtifactSummary {
            scaler_features: scaler.mean.len(),
            model_features: regressor.feature_count(),
            training_rows: regressor.samples.len(),
            n_neighbors: regressor.n_neighbors,
            weights: regressor.weights,
            p: regressor.p,
        };
        Self {
            summary: Some(summary),
            ..Self::new(Box::new(scaler), Box::new(regressor))
        }
    }

    /// Reads `scaler.json`-style and `model.json`-style files.
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactLoadError> {
        let scaler: StandardScaler = read_json(scaler_path)?;
        scaler.validate(scaler_path)?;
        let regressor: KnnRegressor = read_json(model_path)?;
        regressor.validate(model_path)?;
        Ok(Self::from_fitted(scaler, regressor))
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    /// Only available for artifacts read from disk.
    pub fn summary(&self) -> Option<&ArtifactSummary> {
        self.summary.as_ref()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
