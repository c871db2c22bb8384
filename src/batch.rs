use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::ModelArtifacts;
use crate::error::PredictionInputError;
use crate::form::parse_flag;
use crate::models::{GradeClass, ParentalSupport, StudentProfile};
use crate::pipeline;

#[derive(Debug, Deserialize)]
struct CsvRow {
    study_time: f64,
    absences: u32,
    tutoring: String,
    parental_support: u8,
    extracurricular: String,
    sports: String,
    music: String,
    grade_class: u8,
}

impl CsvRow {
    fn into_profile(self) -> Result<StudentProfile, PredictionInputError> {
        let flag = |field: &'static str, value: &str| {
            parse_flag(field, value)
                .map_err(|err| PredictionInputError::InvalidProfile(err.to_string()))
        };
        let profile = StudentProfile {
            study_time: self.study_time,
            absences: self.absences,
            tutoring: flag("tutoring", &self.tutoring)?,
            parental_support: ParentalSupport::try_from(self.parental_support)
                .map_err(PredictionInputError::InvalidProfile)?,
            extracurricular: flag("extracurricular", &self.extracurricular)?,
            sports: flag("sports", &self.sports)?,
            music: flag("music", &self.music)?,
            grade_class: GradeClass::try_from(self.grade_class)
                .map_err(PredictionInputError::InvalidProfile)?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRecord {
    pub row: usize,
    pub gpa: Option<f64>,
    pub category: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

/// Scores every row of `input`. Bad rows are recorded and skipped; an
/// unreadable file fails the whole batch.
pub fn score_csv(artifacts: &ModelArtifacts, input: &Path) -> anyhow::Result<Vec<BatchRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 1;
        let outcome = result
            .map_err(|err| PredictionInputError::InvalidProfile(err.to_string()))
            .and_then(CsvRow::into_profile)
            .and_then(|profile| pipeline::predict(artifacts, &profile));

        let record = match outcome {
            Ok(prediction) => BatchRecord {
                row,
                gpa: Some(prediction.gpa),
                category: Some(prediction.category.to_string()),
                error: None,
            },
            Err(err) => {
                warn!(row, error = %err, "batch row skipped");
                BatchRecord {
                    row,
                    gpa: None,
                    category: None,
                    error: Some(err.to_string()),
                }
            }
        };
        records.push(record);
    }

    Ok(records)
}

pub fn write_results(records: &[BatchRecord], out: &Path) -> anyhow::Result<BatchSummary> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut summary = BatchSummary::default();

    for record in records {
        if record.error.is_some() {
            summary.failed += 1;
        } else {
            summary.scored += 1;
        }
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(scored = summary.scored, failed = summary.failed, out = %out.display(), "batch written");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use std::fs;

    const HEADER: &str =
        "study_time,absences,tutoring,parental_support,extracurricular,sports,music,grade_class";

    #[test]
    fn scores_valid_rows_and_records_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("profiles.csv");
        fs::write(
            &input,
            format!("{HEADER}\n12.0,4,No,0,No,No,No,1\n30,2,Yes,3,1,0,1,2\n55,0,No,0,No,No,No,1\n10,1,No,7,No,No,No,1\n"),
        )
        .unwrap();

        let records = score_csv(&testing::constant(2.61), &input).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].gpa, Some(2.61));
        assert_eq!(records[1].category.as_deref(), Some("Good Performance"));
        assert!(records[2].error.is_some());
        assert!(records[3].error.is_some());
        assert_eq!(records[3].row, 4);
    }

    #[test]
    fn writes_results_with_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("profiles.csv");
        let out = dir.path().join("scored.csv");
        fs::write(&input, format!("{HEADER}\n8,3,No,1,Yes,No,No,2\nabc,3,No,1,Yes,No,No,2\n"))
            .unwrap();

        let records = score_csv(&testing::constant(1.5), &input).unwrap();
        let summary = write_results(&records, &out).unwrap();
        assert_eq!(summary, BatchSummary { scored: 1, failed: 1 });

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("row,gpa,category,error"));
        assert!(written.contains("1,1.5,Academic Risk,"));
    }

    #[test]
    fn missing_input_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        assert!(score_csv(&testing::constant(2.0), &dir.path().join("none.csv")).is_err());
    }
}
