//! Project file loading, saving and discovery.

use super::model::{PROJECT_FILE_NAME, PROJECT_FILE_VERSION, ProjectFile};
use crate::error::{JigError, Result};
use crate::fs::atomic_write_file;
use std::path::{Path, PathBuf};

impl ProjectFile {
    /// Load and validate a project file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| JigError::io("read project file", path, e))?;

        Self::from_yaml(&content).map_err(|e| match e {
            JigError::UserError(message) => {
                JigError::UserError(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Parse a project file from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let project: ProjectFile = serde_yaml::from_str(yaml)
            .map_err(|e| JigError::UserError(format!("failed to parse project YAML: {}", e)))?;

        project.validate()?;
        Ok(project)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            JigError::UserError(format!("failed to serialize project to YAML: {}", e))
        })
    }

    /// Write atomically to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        atomic_write_file(path, &self.to_yaml()?)
    }

    /// Validation rules:
    /// - `version` must match this build's project file version
    /// - `template` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.version != PROJECT_FILE_VERSION {
            return Err(JigError::UserError(format!(
                "unsupported project file version {} (expected {})",
                self.version, PROJECT_FILE_VERSION
            )));
        }
        if self.template.trim().is_empty() {
            return Err(JigError::UserError(
                "project validation failed: template must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Walk up from `start` looking for a directory containing `jig.yaml`.
pub fn find_project_dir<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .find(|dir| dir.join(PROJECT_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}
