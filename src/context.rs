//! Run context shared by every step of one invocation.
//!
//! The context owns the variable mapping that prompts and `set` steps grow,
//! the placeholder table from the spec file metadata, and the two directories a
//! run works between: the template it reads from and the project it writes
//! into.

use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::template::display;

/// Name of the directory inside a template whose executables are put on `PATH`.
pub const TEMPLATE_BIN_DIR: &str = "bin";

/// Mutable state of one run.
///
/// Variables are only ever added or overwritten, never removed.
#[derive(Debug, Clone)]
pub struct Context {
    /// Variables visible to templates and exported to shell steps.
    pub vars: BTreeMap<String, Value>,

    /// Placeholder token → value template, substituted before rendering.
    pub placeholders: BTreeMap<String, String>,

    /// Root of the template (holds `spec.yaml` and render sources).
    pub template_dir: PathBuf,

    /// Root of the generated project (render output, shell working directory).
    pub project_dir: PathBuf,
}

impl Context {
    pub fn new(template_dir: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: BTreeMap::new(),
            placeholders: BTreeMap::new(),
            template_dir: template_dir.into(),
            project_dir: project_dir.into(),
        }
    }

    /// Replace the placeholder table.
    pub fn with_placeholders(mut self, placeholders: BTreeMap<String, String>) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Bind a variable, overwriting any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Variables as a template data object.
    pub fn data(&self) -> Value {
        Value::Object(
            self.vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// The template's `bin/` directory.
    pub fn template_bin_dir(&self) -> PathBuf {
        self.template_dir.join(TEMPLATE_BIN_DIR)
    }

    /// Environment for shell steps as `KEY=VALUE` strings.
    ///
    /// Sources are layered so later ones win: the process environment (when
    /// `include_process` is set), then the project variables, then `PATH`
    /// with the template's `bin/` directory prepended.
    pub fn shell_vars(&self, include_process: bool) -> Vec<String> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        if include_process {
            merged.extend(
                env::vars_os()
                    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
            );
        }
        for (name, value) in &self.vars {
            merged.insert(name.clone(), display(value));
        }

        let path = prepend_path(&self.template_bin_dir(), merged.get("PATH").map(String::as_str));
        merged.insert("PATH".to_string(), path);

        merged
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }
}

/// Interpret a textual value: `true`/`false` become booleans, anything else
/// stays a string.
pub fn typed_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn prepend_path(dir: &Path, existing: Option<&str>) -> String {
    match existing {
        Some(rest) if !rest.is_empty() => format!("{}:{}", dir.display(), rest),
        _ => dir.display().to_string(),
    }
}
