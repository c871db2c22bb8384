//! Bell curve drawn around a point prediction.
//!
//! The regressor exposes no variance, so this curve is decoration: a fixed
//! shape slid to the predicted GPA. It is not a calibrated confidence
//! interval and must not be reported as one.

use std::f64::consts::PI;

use clap::ValueEnum;
use serde::Serialize;

use crate::models::DensityPoint;
use crate::sweep::linspace;

pub const DENSITY_POINTS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DensityStyle {
    /// ±1.0 window, σ = 0.32
    Compact,
    /// ±1.2 window, σ = 0.35
    #[default]
    Wide,
}

impl DensityStyle {
    pub fn half_width(self) -> f64 {
        match self {
            DensityStyle::Compact => 1.0,
            DensityStyle::Wide => 1.2,
        }
    }

    pub fn std_dev(self) -> f64 {
        match self {
            DensityStyle::Compact => 0.32,
            DensityStyle::Wide => 0.35,
        }
    }
}

pub fn gaussian_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * PI).sqrt())
}

pub fn density_curve(gpa: f64, style: DensityStyle) -> Vec<DensityPoint> {
    let half_width = style.half_width();
    linspace(gpa - half_width, gpa + half_width, DENSITY_POINTS)
        .into_iter()
        .map(|x| DensityPoint {
            x,
            density: gaussian_pdf(x, gpa, style.std_dev()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_spans_window_around_prediction() {
        let curve = density_curve(3.0, DensityStyle::Wide);
        assert_eq!(curve.len(), DENSITY_POINTS);
        assert!((curve[0].x - 1.8).abs() < 1e-12);
        assert!((curve[DENSITY_POINTS - 1].x - 4.2).abs() < 1e-12);

        let curve = density_curve(2.0, DensityStyle::Compact);
        assert!((curve[0].x - 1.0).abs() < 1e-12);
        assert!((curve[DENSITY_POINTS - 1].x - 3.0).abs() < 1e-12);
    }

    #[test]
    fn curve_is_symmetric_and_peaks_near_prediction() {
        let curve = density_curve(2.7, DensityStyle::Compact);
        for i in 0..DENSITY_POINTS / 2 {
            let left = curve[i].density;
            let right = curve[DENSITY_POINTS - 1 - i].density;
            assert!((left - right).abs() < 1e-9);
        }
        let peak = curve
            .iter()
            .max_by(|a, b| a.density.total_cmp(&b.density))
            .unwrap();
        assert!((peak.x - 2.7).abs() < 0.01);
    }

    #[test]
    fn pdf_peak_matches_closed_form() {
        let sigma = DensityStyle::Wide.std_dev();
        let expected = 1.0 / (sigma * (2.0 * PI).sqrt());
        assert!((gaussian_pdf(3.1, 3.1, sigma) - expected).abs() < 1e-12);
    }
}
