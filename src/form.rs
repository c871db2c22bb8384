use crate::error::FormError;
use crate::models::{GradeClass, ParentalSupport, StudentProfile, ABSENCES_MAX, STUDY_TIME_MAX};

/// Working copy of the profile inputs, edited one field at a time.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    profile: StudentProfile,
}

fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> FormError {
    FormError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Accepts the form's Yes/No labels as well as 1/0 and true/false.
pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "1" | "true" => Ok(true),
        "no" | "n" | "0" | "false" => Ok(false),
        _ => Err(invalid(field, value, "expected Yes or No")),
    }
}

impl ProfileForm {
    pub fn profile(&self) -> StudentProfile {
        self.profile
    }

    pub fn reset(&mut self) {
        self.profile = StudentProfile::default();
    }

    /// Applies one edit. A rejected value leaves the form as it was.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FormError> {
        let raw = value.trim();
        match key.trim() {
            "study_time" => {
                let hours: f64 = raw
                    .parse()
                    .map_err(|_| invalid("study_time", raw, "expected a number"))?;
                if !hours.is_finite() || !(0.0..=STUDY_TIME_MAX).contains(&hours) {
                    let reason = format!("must be within 0-{STUDY_TIME_MAX}");
                    return Err(invalid("study_time", raw, reason));
                }
                self.profile.study_time = hours;
            }
            "absences" => {
                let count: u32 = raw
                    .parse()
                    .map_err(|_| invalid("absences", raw, "expected a whole number"))?;
                if count > ABSENCES_MAX {
                    let reason = format!("must be within 0-{ABSENCES_MAX}");
                    return Err(invalid("absences", raw, reason));
                }
                self.profile.absences = count;
            }
            "tutoring" => self.profile.tutoring = parse_flag("tutoring", raw)?,
            "parental_support" => {
                let code: u8 = raw
                    .parse()
                    .map_err(|_| invalid("parental_support", raw, "expected 0-3"))?;
                self.profile.parental_support = ParentalSupport::try_from(code)
                    .map_err(|reason| invalid("parental_support", raw, reason))?;
            }
            "extracurricular" => {
                self.profile.extracurricular = parse_flag("extracurricular", raw)?
            }
            "sports" => self.profile.sports = parse_flag("sports", raw)?,
            "music" => self.profile.music = parse_flag("music", raw)?,
            "grade_class" => {
                let code: u8 = raw
                    .parse()
                    .map_err(|_| invalid("grade_class", raw, "expected 1-4"))?;
                self.profile.grade_class = GradeClass::try_from(code)
                    .map_err(|reason| invalid("grade_class", raw, reason))?;
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Applies whitespace-separated `key=value` pairs. All pairs are
    /// validated before any of them is applied.
    pub fn apply_line(&mut self, line: &str) -> Result<(), FormError> {
        let mut draft = self.clone();
        for pair in line.split_whitespace() {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| FormError::Malformed(pair.to_string()))?;
            draft.set(key, value)?;
        }
        *self = draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_widget_defaults() {
        let form = ProfileForm::default();
        assert_eq!(form.profile(), StudentProfile::default());
    }

    #[test]
    fn applies_labels_and_codes() {
        let mut form = ProfileForm::default();
        form.apply_line("study_time=20.5 tutoring=Yes music=1 parental_support=2 grade_class=3")
            .unwrap();
        let profile = form.profile();
        assert_eq!(profile.study_time, 20.5);
        assert!(profile.tutoring);
        assert!(profile.music);
        assert_eq!(profile.parental_support, ParentalSupport::Moderate);
        assert_eq!(profile.grade_class, GradeClass::Third);
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let mut form = ProfileForm::default();
        assert!(form.set("study_time", "41").is_err());
        assert!(form.set("absences", "51").is_err());
        assert!(form.set("parental_support", "4").is_err());
        assert!(form.set("grade_class", "0").is_err());
        assert!(form.set("sports", "maybe").is_err());
        assert_eq!(form.profile(), StudentProfile::default());
    }

    #[test]
    fn bad_pair_discards_whole_line() {
        let mut form = ProfileForm::default();
        let err = form.apply_line("absences=10 color=blue").unwrap_err();
        assert_eq!(err, FormError::UnknownField("color".to_string()));
        assert_eq!(form.profile().absences, 4);

        assert!(matches!(
            form.apply_line("absences").unwrap_err(),
            FormError::Malformed(_)
        ));
    }
}
