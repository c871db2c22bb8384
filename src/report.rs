use std::fmt::Write;

use crate::density::{self, DensityStyle};
use crate::models::{SessionSnapshot, StudentProfile, SweepPoint, ABSENCES_MAX, STUDY_TIME_MAX};

/// Every attribute scaled into 0-1 for the radar view. Absences are
/// inverted so that a larger value is always better.
pub fn profile_axes(profile: &StudentProfile) -> Vec<(&'static str, f64)> {
    let flag = |value: bool| if value { 1.0 } else { 0.0 };
    vec![
        ("Study Time", profile.study_time / STUDY_TIME_MAX),
        (
            "Attendance",
            1.0 - f64::from(profile.absences) / f64::from(ABSENCES_MAX),
        ),
        ("Tutoring", flag(profile.tutoring)),
        (
            "Parental Support",
            f64::from(profile.parental_support.code()) / 3.0,
        ),
        ("Extracurricular", flag(profile.extracurricular)),
        ("Sports", flag(profile.sports)),
        ("Music", flag(profile.music)),
        (
            "Grade Class",
            f64::from(profile.grade_class.code() - 1) / 3.0,
        ),
    ]
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn build_report(
    snapshot: &SessionSnapshot,
    sweep: &[SweepPoint],
    style: DensityStyle,
) -> String {
    let profile = &snapshot.profile;
    let result = &snapshot.result;
    let mut output = String::new();

    let _ = writeln!(output, "# Student GPA Prediction Report");
    let _ = writeln!(
        output,
        "Generated {}",
        snapshot.predicted_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Prediction");
    let _ = writeln!(output, "- Predicted GPA: {:.2}", result.gpa);
    let _ = writeln!(output, "- Category: {}", result.category);
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", result.category.commentary());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Profile");
    let _ = writeln!(output, "- Study time: {:.1} hours/week", profile.study_time);
    let _ = writeln!(output, "- Absences: {}", profile.absences);
    let _ = writeln!(output, "- Tutoring: {}", yes_no(profile.tutoring));
    let _ = writeln!(
        output,
        "- Parental support level: {}",
        profile.parental_support.code()
    );
    let _ = writeln!(output, "- Extracurricular: {}", yes_no(profile.extracurricular));
    let _ = writeln!(output, "- Sports: {}", yes_no(profile.sports));
    let _ = writeln!(output, "- Music: {}", yes_no(profile.music));
    let _ = writeln!(output, "- Grade class: {}", profile.grade_class.code());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Profile Axes");
    for (axis, value) in profile_axes(profile) {
        let _ = writeln!(output, "- {}: {:.2}", axis, value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Study Time What-If");

    if sweep.is_empty() {
        let _ = writeln!(output, "No sweep computed.");
    } else {
        let _ = writeln!(output, "| Study hours | GPA |");
        let _ = writeln!(output, "|---|---|");
        for point in sweep.iter().step_by(4) {
            let _ = writeln!(output, "| {:.1} | {:.2} |", point.study_time, point.gpa);
        }
        if let Some(best) = sweep.iter().max_by(|a, b| a.gpa.total_cmp(&b.gpa)) {
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "Highest simulated GPA {:.2} at {:.1} study hours.",
                best.gpa, best.study_time
            );
        }
    }

    let curve = density::density_curve(result.gpa, style);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Prediction Spread (illustrative)");
    if let (Some(first), Some(last)) = (curve.first(), curve.last()) {
        let _ = writeln!(
            output,
            "Bell curve centered at {:.2} with σ {:.2}, drawn over {:.2} to {:.2}.",
            result.gpa,
            style.std_dev(),
            first.x,
            last.x
        );
    }
    let _ = writeln!(
        output,
        "This curve is a fixed-width decoration, not a calibrated confidence interval."
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradeClass, ParentalSupport, PerformanceBand, PredictionResult};
    use chrono::Utc;

    fn snapshot(gpa: f64) -> SessionSnapshot {
        SessionSnapshot {
            profile: StudentProfile::default(),
            result: PredictionResult {
                gpa,
                category: PerformanceBand::classify(gpa),
            },
            predicted_at: Utc::now(),
        }
    }

    #[test]
    fn axes_are_normalized() {
        let profile = StudentProfile {
            study_time: 40.0,
            absences: 50,
            tutoring: true,
            parental_support: ParentalSupport::High,
            extracurricular: false,
            sports: false,
            music: true,
            grade_class: GradeClass::First,
        };
        let axes = profile_axes(&profile);
        assert_eq!(axes.len(), 8);
        assert!(axes.iter().all(|(_, v)| (0.0..=1.0).contains(v)));
        assert_eq!(axes[0].1, 1.0);
        assert_eq!(axes[1].1, 0.0);
        assert_eq!(axes[3].1, 1.0);
        assert_eq!(axes[7].1, 0.0);
    }

    #[test]
    fn report_contains_prediction_and_disclaimer() {
        let sweep: Vec<SweepPoint> = (0..40)
            .map(|i| SweepPoint {
                study_time: i as f64,
                gpa: 1.0 + i as f64 * 0.05,
            })
            .collect();
        let report = build_report(&snapshot(1.72), &sweep, DensityStyle::Wide);
        assert!(report.contains("- Predicted GPA: 1.72"));
        assert!(report.contains("- Category: Academic Risk"));
        assert!(report.contains(PerformanceBand::AcademicRisk.commentary()));
        assert!(report.contains("Highest simulated GPA 2.95 at 39.0 study hours."));
        assert!(report.contains("not a calibrated confidence interval"));
    }

    #[test]
    fn report_handles_missing_sweep() {
        let report = build_report(&snapshot(3.1), &[], DensityStyle::Compact);
        assert!(report.contains("No sweep computed."));
        assert!(report.contains("Good Performance"));
    }
}
