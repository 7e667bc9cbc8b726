//! JSONL trail writer.
//!
//! Appends `TrailOperation` records to `{trail_dir}/{scope}.jsonl`. Uses
//! `serde_jsonlines::append_json_lines` for per-line appends.

use std::path::{Path, PathBuf};

use trb_core::trail::TrailOperation;

use crate::error::EngineError;

/// Appends trail operations to per-scope JSONL files.
///
/// `TribunalService` calls `append()` after the database transaction commits.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, EngineError> {
        std::fs::create_dir_all(&trail_dir).map_err(|e| EngineError::Other(e.into()))?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for testing or when the trail is off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether trail writing is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a trail operation to its scope's JSONL file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the file write fails.
    pub fn append(&self, op: &TrailOperation) -> Result<(), EngineError> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.scope_path(&op.scope);
        serde_jsonlines::append_json_lines(&path, [op])
            .map_err(|e| EngineError::Other(e.into()))?;
        Ok(())
    }

    /// Read back every operation recorded for `scope`, oldest first.
    ///
    /// A scope with no file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the file exists but cannot be parsed.
    pub fn read_scope(&self, scope: &str) -> Result<Vec<TrailOperation>, EngineError> {
        let path = self.scope_path(scope);
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(&path)
            .map_err(|e| EngineError::Other(e.into()))?
            .collect::<std::io::Result<Vec<TrailOperation>>>()
            .map_err(|e| EngineError::Other(e.into()))
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }

    fn scope_path(&self, scope: &str) -> PathBuf {
        self.trail_dir.join(format!("{scope}.jsonl"))
    }
}
