use super::RawManualProject;
use crate::Result;
use ohno::IntoAppError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const LOG_TARGET: &str = "    manual";

/// Read access to the store holding manually curated projects.
pub trait ManualStore: Send + Sync {
    /// All projects stored for `user_id`. An unknown user has no projects.
    fn list_projects(&self, user_id: &str) -> impl Future<Output = Result<Vec<RawManualProject>>> + Send;
}

/// A store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<String, Vec<RawManualProject>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the projects stored for `user_id`.
    pub fn insert(&self, user_id: impl Into<String>, projects: Vec<RawManualProject>) {
        let _ = self
            .projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.into(), projects);
    }
}

impl ManualStore for MemoryStore {
    async fn list_projects(&self, user_id: &str) -> Result<Vec<RawManualProject>> {
        let projects = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(projects.get(user_id).cloned().unwrap_or_default())
    }
}

/// A store backed by a JSON document mapping user ids to arrays of projects.
///
/// ```json
/// { "user-1": [ { "id": "a", "title": "Home lab", "stack": ["nix"] } ] }
/// ```
///
/// The file is read on every call so edits are picked up without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManualStore for JsonFileStore {
    async fn list_projects(&self, user_id: &str) -> Result<Vec<RawManualProject>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .into_app_err_with(|| format!("reading manual project store '{}'", self.path.display()))?;

        let mut document: HashMap<String, Vec<RawManualProject>> = serde_json::from_str(&text)
            .into_app_err_with(|| format!("parsing manual project store '{}'", self.path.display()))?;

        let projects = document.remove(user_id).unwrap_or_default();
        log::debug!(target: LOG_TARGET, "Loaded {} manual project(s) from '{}'", projects.len(), self.path.display());
        Ok(projects)
    }
}
