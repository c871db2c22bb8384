use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring the scaler or regressor into memory. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Failure of a single prediction request. The caller reports it and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionInputError {
    #[error("expected {expected} features, got {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("feature {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("model returned an unusable value: {0}")]
    Model(String),
}

/// Rejected edit to the profile form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("invalid value `{value}` for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("expected key=value, got `{0}`")]
    Malformed(String),
}
