use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::artifacts::ModelArtifacts;
use crate::error::PredictionInputError;
use crate::models::{PredictionResult, SessionSnapshot, StudentProfile};
use crate::pipeline;

/// Latest prediction for one interactive session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub last: Option<SessionSnapshot>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            last: None,
        }
    }

    pub fn last(&self) -> Option<&SessionSnapshot> {
        self.last.as_ref()
    }

    /// Runs the pipeline and replaces the stored snapshot only on success.
    pub fn submit(
        &mut self,
        artifacts: &ModelArtifacts,
        profile: StudentProfile,
    ) -> Result<PredictionResult, PredictionInputError> {
        let result = match pipeline::predict(artifacts, &profile) {
            Ok(result) => result,
            Err(err) => {
                warn!(session = %self.id, error = %err, "prediction rejected");
                return Err(err);
            }
        };

        self.last = Some(SessionSnapshot {
            profile,
            result,
            predicted_at: Utc::now(),
        });
        info!(
            session = %self.id,
            gpa = result.gpa,
            category = %result.category,
            "prediction stored"
        );
        Ok(result)
    }
}
