//! Profile repository backed by a single JSON file

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::hardware::{ProfileRepository, StoredProfile};
use crate::domain::DomainError;

/// Stores the saved profile as `{ "savedAt": ..., "profile": { ... } }`
#[derive(Debug, Clone)]
pub struct JsonFileProfileRepository {
    path: PathBuf,
}

impl JsonFileProfileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileRepository for JsonFileProfileRepository {
    fn get(&self) -> Result<Option<StoredProfile>, DomainError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read profile '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let record = serde_json::from_str(&content).map_err(|e| {
            DomainError::storage(format!(
                "Corrupt profile record '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(record))
    }

    fn set(&self, record: StoredProfile) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create profile directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| DomainError::internal(format!("Failed to serialize profile: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            DomainError::storage(format!(
                "Failed to write profile '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "Saved hardware profile");
        Ok(())
    }

    fn clear(&self) -> Result<bool, DomainError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared hardware profile");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to remove profile '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}
