use tracing::debug;

use crate::artifacts::ModelArtifacts;
use crate::encoder;
use crate::error::PredictionInputError;
use crate::models::{StudentProfile, SweepPoint, STUDY_TIME_MAX};
use crate::pipeline;

pub const SWEEP_POINTS: usize = 40;
pub const GPA_MIN: f64 = 0.0;
pub const GPA_MAX: f64 = 4.0;

/// `count` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Re-runs the model across the full study time range with every other
/// attribute held fixed. Simulated GPAs are clamped to the 0-4 scale.
pub fn sensitivity_sweep(
    artifacts: &ModelArtifacts,
    profile: &StudentProfile,
) -> Result<Vec<SweepPoint>, PredictionInputError> {
    profile.validate()?;
    let mut points = Vec::with_capacity(SWEEP_POINTS);
    for study_time in linspace(0.0, STUDY_TIME_MAX, SWEEP_POINTS) {
        let features = encoder::encode(&profile.with_study_time(study_time));
        let gpa = pipeline::raw_gpa(artifacts, &features)?;
        points.push(SweepPoint {
            study_time,
            gpa: gpa.clamp(GPA_MIN, GPA_MAX),
        });
    }

    debug!(points = points.len(), "sensitivity sweep complete");
    Ok(points)
}
