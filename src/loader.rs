use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::info;

use crate::artifacts::ModelArtifacts;
use crate::error::ArtifactLoadError;

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub model: PathBuf,
}

/// Owns the model artifacts for the lifetime of the process. Built once in
/// `main` and handed to every command by reference.
pub struct ArtifactStore {
    paths: Option<ArtifactPaths>,
    cell: OnceLock<Arc<ModelArtifacts>>,
    // serializes first loads so a failed read is not raced by a second one
    init: Mutex<()>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths: Some(paths),
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn preloaded(artifacts: ModelArtifacts) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(artifacts));
        Self {
            paths: None,
            cell,
            init: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> Option<&ArtifactPaths> {
        self.paths.as_ref()
    }

    /// Reads the artifacts on first call. Concurrent first callers wait for
    /// the load in flight; every later call returns the same instance.
    pub fn get_or_load(&self) -> Result<Arc<ModelArtifacts>, ArtifactLoadError> {
        if let Some(artifacts) = self.cell.get() {
            return Ok(Arc::clone(artifacts));
        }

        let _guard = self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(artifacts) = self.cell.get() {
            return Ok(Arc::clone(artifacts));
        }

        let paths = self.paths.as_ref().ok_or_else(|| ArtifactLoadError::Invalid {
            path: PathBuf::new(),
            reason: "store has no artifact paths".to_string(),
        })?;
        let artifacts = Arc::new(ModelArtifacts::load(&paths.scaler, &paths.model)?);
        if let Some(summary) = artifacts.summary() {
            info!(
                scaler = %paths.scaler.display(),
                model = %paths.model.display(),
                training_rows = summary.training_rows,
                n_neighbors = summary.n_neighbors,
                "model artifacts loaded"
            );
        }
        let _ = self.cell.set(Arc::clone(&artifacts));
        Ok(artifacts)
    }
}
