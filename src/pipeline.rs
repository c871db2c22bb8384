use tracing::debug;

use crate::artifacts::ModelArtifacts;
use crate::encoder;
use crate::error::PredictionInputError;
use crate::models::{PerformanceBand, PredictionResult, StudentProfile};

/// Scaler transform followed by the regressor, no rounding or clamping.
pub fn raw_gpa(artifacts: &ModelArtifacts, features: &[f64]) -> Result<f64, PredictionInputError> {
    let scaled = artifacts.scaler().transform(features)?;
    let gpa = artifacts.regressor().predict(&scaled)?;
    if !gpa.is_finite() {
        return Err(PredictionInputError::Model(format!("prediction is {gpa}")));
    }
    Ok(gpa)
}

/// Two decimals, exact halves go to the even neighbor.
pub fn round_gpa(gpa: f64) -> f64 {
    (gpa * 100.0).round_ties_even() / 100.0
}

/// The displayed estimate is rounded but never clamped; values outside
/// 0-4 are shown as the model produced them.
pub fn predict(
    artifacts: &ModelArtifacts,
    profile: &StudentProfile,
) -> Result<PredictionResult, PredictionInputError> {
    profile.validate()?;
    let features = encoder::encode(profile);
    let gpa = round_gpa(raw_gpa(artifacts, &features)?);
    let category = PerformanceBand::classify(gpa);
    debug!(gpa, %category, "prediction complete");
    Ok(PredictionResult { gpa, category })
}
