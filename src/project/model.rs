//! Project file struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// File name of the project file.
pub const PROJECT_FILE_NAME: &str = "jig.yaml";

/// Version written to and expected in project files.
pub const PROJECT_FILE_VERSION: &str = "0.2.0";

/// Contents of `jig.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default = "default_version")]
    pub version: String,

    /// Name of the template under the templates directory.
    pub template: String,

    /// Project variables, restored into the context on every run.
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
}

fn default_version() -> String {
    PROJECT_FILE_VERSION.to_string()
}

impl ProjectFile {
    pub fn new(template: impl Into<String>, vars: BTreeMap<String, Value>) -> Self {
        Self {
            version: default_version(),
            template: template.into(),
            vars,
        }
    }
}
