use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PredictionInputError;

pub const STUDY_TIME_MAX: f64 = 40.0;
pub const ABSENCES_MAX: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ParentalSupport {
    None,
    Low,
    Moderate,
    High,
}

impl ParentalSupport {
    pub fn code(self) -> u8 {
        match self {
            ParentalSupport::None => 0,
            ParentalSupport::Low => 1,
            ParentalSupport::Moderate => 2,
            ParentalSupport::High => 3,
        }
    }
}

impl TryFrom<u8> for ParentalSupport {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ParentalSupport::None),
            1 => Ok(ParentalSupport::Low),
            2 => Ok(ParentalSupport::Moderate),
            3 => Ok(ParentalSupport::High),
            other => Err(format!("parental support must be 0-3, got {other}")),
        }
    }
}

impl From<ParentalSupport> for u8 {
    fn from(value: ParentalSupport) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GradeClass {
    First,
    Second,
    Third,
    Fourth,
}

impl GradeClass {
    pub fn code(self) -> u8 {
        match self {
            GradeClass::First => 1,
            GradeClass::Second => 2,
            GradeClass::Third => 3,
            GradeClass::Fourth => 4,
        }
    }
}

impl TryFrom<u8> for GradeClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GradeClass::First),
            2 => Ok(GradeClass::Second),
            3 => Ok(GradeClass::Third),
            4 => Ok(GradeClass::Fourth),
            other => Err(format!("grade class must be 1-4, got {other}")),
        }
    }
}

impl From<GradeClass> for u8 {
    fn from(value: GradeClass) -> Self {
        value.code()
    }
}

/// The eight attributes the model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub study_time: f64,
    pub absences: u32,
    pub tutoring: bool,
    pub parental_support: ParentalSupport,
    pub extracurricular: bool,
    pub sports: bool,
    pub music: bool,
    pub grade_class: GradeClass,
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            study_time: 12.0,
            absences: 4,
            tutoring: false,
            parental_support: ParentalSupport::None,
            extracurricular: false,
            sports: false,
            music: false,
            grade_class: GradeClass::First,
        }
    }
}

impl StudentProfile {
    /// Rejects values the input widgets could never produce.
    pub fn validate(&self) -> Result<(), PredictionInputError> {
        if !self.study_time.is_finite() || !(0.0..=STUDY_TIME_MAX).contains(&self.study_time) {
            return Err(PredictionInputError::InvalidProfile(format!(
                "study time must be within 0-{STUDY_TIME_MAX}, got {}",
                self.study_time
            )));
        }
        if self.absences > ABSENCES_MAX {
            return Err(PredictionInputError::InvalidProfile(format!(
                "absences must be within 0-{ABSENCES_MAX}, got {}",
                self.absences
            )));
        }
        Ok(())
    }

    pub fn with_study_time(mut self, study_time: f64) -> Self {
        self.study_time = study_time;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceBand {
    #[serde(rename = "Excellent Performance")]
    Excellent,
    #[serde(rename = "Good Performance")]
    Good,
    #[serde(rename = "Average Performance")]
    Average,
    #[serde(rename = "Academic Risk")]
    AcademicRisk,
}

pub const EXCELLENT_FLOOR: f64 = 3.5;
pub const GOOD_FLOOR: f64 = 2.5;
pub const AVERAGE_FLOOR: f64 = 1.8;

impl PerformanceBand {
    pub fn classify(gpa: f64) -> Self {
        if gpa >= EXCELLENT_FLOOR {
            PerformanceBand::Excellent
        } else if gpa >= GOOD_FLOOR {
            PerformanceBand::Good
        } else if gpa >= AVERAGE_FLOOR {
            PerformanceBand::Average
        } else {
            PerformanceBand::AcademicRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent Performance",
            PerformanceBand::Good => "Good Performance",
            PerformanceBand::Average => "Average Performance",
            PerformanceBand::AcademicRisk => "Academic Risk",
        }
    }

    pub fn commentary(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => {
                "Strong academic standing. Current habits are working; keep study time steady and attendance high."
            }
            PerformanceBand::Good => {
                "Solid performance with room to grow. A few extra study hours or fewer absences could lift the result into the top band."
            }
            PerformanceBand::Average => {
                "Middle of the range. Tutoring support and a more regular study schedule are the most direct levers."
            }
            PerformanceBand::AcademicRisk => {
                "Predicted GPA is below the risk threshold. Early outreach, tutoring and an attendance plan are recommended."
            }
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub gpa: f64,
    pub category: PerformanceBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub study_time: f64,
    pub gpa: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub profile: StudentProfile,
    pub result: PredictionResult,
    pub predicted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_closed_below() {
        assert_eq!(PerformanceBand::classify(1.8), PerformanceBand::Average);
        assert_eq!(PerformanceBand::classify(1.79999), PerformanceBand::AcademicRisk);
        assert_eq!(PerformanceBand::classify(2.5), PerformanceBand::Good);
        assert_eq!(PerformanceBand::classify(2.49), PerformanceBand::Average);
        assert_eq!(PerformanceBand::classify(3.5), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::classify(3.49), PerformanceBand::Good);
    }

    #[test]
    fn bands_cover_out_of_range_values() {
        assert_eq!(PerformanceBand::classify(-2.0), PerformanceBand::AcademicRisk);
        assert_eq!(PerformanceBand::classify(7.0), PerformanceBand::Excellent);
    }

    #[test]
    fn band_serializes_as_display_label() {
        let json = serde_json::to_string(&PerformanceBand::AcademicRisk).unwrap();
        assert_eq!(json, "\"Academic Risk\"");
        assert_eq!(PerformanceBand::Good.to_string(), "Good Performance");
    }

    #[test]
    fn ordinal_codes_reject_out_of_domain_values() {
        assert!(ParentalSupport::try_from(4).is_err());
        assert!(GradeClass::try_from(0).is_err());
        assert_eq!(GradeClass::try_from(4).unwrap(), GradeClass::Fourth);
    }

    #[test]
    fn validate_rejects_study_time_outside_widget_range() {
        let profile = StudentProfile::default().with_study_time(40.5);
        assert!(profile.validate().is_err());
        let profile = StudentProfile {
            absences: 51,
            ..StudentProfile::default()
        };
        assert!(profile.validate().is_err());
        assert!(StudentProfile::default().validate().is_ok());
    }
}
