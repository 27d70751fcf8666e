//! File-backed mirror of the last known todo list.
//!
//! Used only when the API cannot be reached. Nothing here ever returns an
//! error: unreadable data falls back to the seed list and write failures
//! are reported through [`CacheWrite`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::seed;
use crate::domain::todo::Todo;

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CacheWrite {
    Written,
    Failed(String),
}

impl CacheWrite {
    pub fn is_written(&self) -> bool { matches!(self, CacheWrite::Written) }
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    /// The persisted list, or the seed list when nothing usable is stored.
    pub fn load(&self) -> Vec<Todo> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no cached todos, using seed");
                return seed::todos();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cached todos are unreadable, using seed");
                return seed::todos();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(todos) => todos,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cached todos are corrupt, using seed");
                seed::todos()
            }
        }
    }

    /// Replaces the stored list.
    pub fn save(&self, todos: &[Todo]) -> CacheWrite {
        match self.write(todos) {
            Ok(()) => CacheWrite::Written,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to save todos");
                CacheWrite::Failed(e.to_string())
            }
        }
    }

    fn write(&self, todos: &[Todo]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; }
        }
        fs::write(&self.path, serde_json::to_vec(todos)?)?;
        Ok(())
    }
}
