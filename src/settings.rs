//! Locations of the jig home directory and its template repository.
//!
//! The home directory is `$JIG_HOME`, or `~/.jig` when unset. It holds a
//! clone of the template repository; templates are the sub-directories of
//! `templates/` that contain a spec file.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{JigError, Result};
use crate::fs::join_within;
use crate::spec::SPEC_FILE_NAME;

pub const HOME_ENV: &str = "JIG_HOME";
pub const REPO_ENV: &str = "JIG_REPO";
const DEFAULT_HOME_DIR: &str = ".jig";
const TEMPLATES_DIR: &str = "templates";

/// Resolved jig locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub home: PathBuf,
    /// Git URL of the template repository, if configured.
    pub repo_url: Option<String>,
}

impl Settings {
    /// Resolve settings from the environment.
    pub fn from_env() -> Result<Self> {
        let home = match env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    JigError::UserError(format!(
                        "cannot determine home directory; set {}",
                        HOME_ENV
                    ))
                })?
                .join(DEFAULT_HOME_DIR),
        };
        let repo_url = env::var(REPO_ENV).ok().filter(|v| !v.is_empty());
        Ok(Self { home, repo_url })
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            repo_url: None,
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.home.join(TEMPLATES_DIR)
    }

    /// Directory of the named template; fails if it has no spec file.
    pub fn template_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = join_within(&self.templates_dir(), name)?;
        if !is_template(&dir) {
            return Err(JigError::UserError(format!(
                "template {:?} not found in '{}'",
                name,
                self.templates_dir().display()
            )));
        }
        Ok(dir)
    }

    /// Names of the available templates, sorted.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let dir = self.templates_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| JigError::io("read directory", &dir, e))? {
            let entry = entry.map_err(|e| JigError::io("read directory", &dir, e))?;
            if is_template(&entry.path())
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn is_template(dir: &Path) -> bool {
    dir.join(SPEC_FILE_NAME).is_file()
}
