use crate::models::StudentProfile;

pub const FEATURE_COUNT: usize = 8;

/// Column order the scaler and regressor were fitted on. Reordering this
/// silently corrupts every prediction.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "study_time",
    "absences",
    "tutoring",
    "parental_support",
    "extracurricular",
    "sports",
    "music",
    "grade_class",
];

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub fn encode(profile: &StudentProfile) -> [f64; FEATURE_COUNT] {
    [
        profile.study_time,
        f64::from(profile.absences),
        flag(profile.tutoring),
        f64::from(profile.parental_support.code()),
        flag(profile.extracurricular),
        flag(profile.sports),
        flag(profile.music),
        f64::from(profile.grade_class.code()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradeClass, ParentalSupport};

    #[test]
    fn default_profile_encodes_in_fixed_order() {
        let encoded = encode(&StudentProfile::default());
        assert_eq!(encoded, [12.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn booleans_map_to_zero_or_one() {
        let profile = StudentProfile {
            study_time: 7.5,
            absences: 0,
            tutoring: true,
            parental_support: ParentalSupport::High,
            extracurricular: false,
            sports: true,
            music: true,
            grade_class: GradeClass::Fourth,
        };
        let encoded = encode(&profile);
        assert_eq!(encoded.len(), FEATURE_NAMES.len());
        assert_eq!(encoded, [7.5, 0.0, 1.0, 3.0, 0.0, 1.0, 1.0, 4.0]);
        for index in [2, 4, 5, 6] {
            assert!(encoded[index] == 0.0 || encoded[index] == 1.0);
        }
    }
}
