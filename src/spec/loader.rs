//! Loading `spec.yaml` into a [`Spec`].
//!
//! Metadata goes through serde; step lists are walked by hand because a
//! step's shape is decided by which keys it carries.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::model::{Action, ActionRegistry, ChoiceItem, OptionItem, Spec, Step};
use crate::error::{JigError, Result};

/// File name of the spec inside a template directory.
pub const SPEC_FILE_NAME: &str = "spec.yaml";

/// The only spec version this build understands.
pub const SPEC_VERSION: &str = "0.2.0";

const STEP_KEYS: [&str; 8] = [
    "input", "option", "options", "choice", "set", "render", "exec", "do",
];

#[derive(Debug, Deserialize)]
struct RawSpec {
    metadata: RawMetadata,
    actions: Mapping,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    name: String,
    description: String,
    version: String,
    #[serde(default)]
    placeholders: BTreeMap<String, String>,
}

impl Spec {
    /// Load `spec.yaml` from a template directory.
    pub fn load<P: AsRef<Path>>(template_dir: P) -> Result<Self> {
        let path = template_dir.as_ref().join(SPEC_FILE_NAME);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| JigError::io("read spec file", &path, e))?;

        Self::from_yaml(&content).map_err(|e| match e {
            JigError::UserError(message) => {
                JigError::UserError(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Parse a spec from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: RawSpec = serde_yaml::from_str(yaml)
            .map_err(|e| JigError::UserError(format!("failed to parse spec YAML: {}", e)))?;

        if raw.metadata.version != SPEC_VERSION {
            return Err(JigError::UserError(format!(
                "unsupported spec file version {} (expected {})",
                raw.metadata.version, SPEC_VERSION
            )));
        }

        let mut actions = ActionRegistry::new();
        for (key, value) in &raw.actions {
            let name = key.as_str().ok_or_else(|| {
                JigError::UserError(format!("action names must be strings, found {:?}", key))
            })?;
            let Value::Sequence(list) = value else {
                return Err(JigError::UserError(format!(
                    "value of action {:?} must be a list",
                    name
                )));
            };
            actions.insert(Action {
                name: name.to_string(),
                steps: load_steps(name, list)?,
            });
        }

        Ok(Spec {
            name: raw.metadata.name,
            description: raw.metadata.description,
            version: raw.metadata.version,
            placeholders: raw.metadata.placeholders,
            actions,
        })
    }
}

fn load_steps(scope: &str, list: &[Value]) -> Result<Vec<Step>> {
    list.iter()
        .enumerate()
        .map(|(i, node)| load_step(scope, i + 1, node))
        .collect()
}

fn load_step(scope: &str, index: usize, node: &Value) -> Result<Step> {
    let unsupported = |reason: String| JigError::UnsupportedStep {
        action: scope.to_string(),
        index,
        reason,
    };

    let Value::Mapping(map) = node else {
        return Err(unsupported("step must be a mapping".to_string()));
    };

    let mut step_keys = Vec::new();
    for key in map.keys() {
        match key.as_str() {
            Some(k) if STEP_KEYS.contains(&k) => step_keys.push(k),
            Some("if" | "then") => {}
            Some(k) => return Err(unsupported(format!("unknown key {:?}", k))),
            None => return Err(unsupported(format!("non-string key {:?}", key))),
        }
    }

    let Some(condition) = map.get("if") else {
        if map.contains_key("then") {
            return Err(unsupported("\"then\" without \"if\"".to_string()));
        }
        return match step_keys.as_slice() {
            [key] => load_keyed(key, &map[*key]).map_err(|r| unsupported(format!("{}: {}", key, r))),
            [] => Err(unsupported(format!(
                "expected one of {}",
                STEP_KEYS.join(", ")
            ))),
            several => Err(unsupported(format!(
                "several step keys: {}",
                several.join(", ")
            ))),
        };
    };

    let condition =
        scalar_string(condition).ok_or_else(|| unsupported("\"if\" must be a string".to_string()))?;

    match (map.get("then"), step_keys.as_slice()) {
        (Some(Value::Sequence(list)), []) => {
            let nested = format!("{} step #{} then", scope, index);
            Ok(Step::If {
                condition,
                then: load_steps(&nested, list)?,
            })
        }
        (Some(_), []) => Err(unsupported("\"then\" must be a list".to_string())),
        (Some(_), _) => Err(unsupported(
            "\"if\" with \"then\" cannot carry another step key".to_string(),
        )),
        (None, [key]) => {
            let step =
                load_keyed(key, &map[*key]).map_err(|r| unsupported(format!("{}: {}", key, r)))?;
            Ok(Step::If {
                condition,
                then: vec![step],
            })
        }
        (None, []) => Err(unsupported(
            "\"if\" needs \"then\" or a step key".to_string(),
        )),
        (None, several) => Err(unsupported(format!(
            "several step keys: {}",
            several.join(", ")
        ))),
    }
}

type FieldResult<T> = std::result::Result<T, String>;

/// Build the step for `key`; errors are bare reasons.
fn load_keyed(key: &str, value: &Value) -> FieldResult<Step> {
    let step = match key {
        "input" => {
            let map = as_mapping(value)?;
            Step::Prompt {
                question: required_string(map, "question")?,
                var: required_string(map, "var")?,
                default: optional_string(map, "default")?,
            }
        }
        "option" => {
            let map = as_mapping(value)?;
            Step::OptionPrompt {
                question: required_string(map, "question")?,
                var: required_string(map, "var")?,
                default: optional_bool(map, "default")?,
            }
        }
        "options" => {
            let map = as_mapping(value)?;
            let items = required_list(map, "items")?
                .iter()
                .map(|item| {
                    let item = as_mapping(item)?;
                    Ok(OptionItem {
                        text: required_string(item, "text")?,
                        var: required_string(item, "var")?,
                        default: optional_bool(item, "default")?,
                    })
                })
                .collect::<FieldResult<Vec<_>>>()?;
            Step::MultiOptionPrompt {
                question: required_string(map, "question")?,
                items,
            }
        }
        "choice" => {
            let map = as_mapping(value)?;
            let items = required_list(map, "items")?
                .iter()
                .map(|item| {
                    let item = as_mapping(item)?;
                    Ok(ChoiceItem {
                        text: required_string(item, "text")?,
                        value: required_string(item, "value")?,
                    })
                })
                .collect::<FieldResult<Vec<_>>>()?;
            if items.is_empty() {
                return Err("\"items\" must not be empty".to_string());
            }
            Step::ChoicePrompt {
                question: required_string(map, "question")?,
                var: required_string(map, "var")?,
                default: optional_string(map, "default")?,
                items,
            }
        }
        "set" => {
            let map = as_mapping(value)?;
            let vars = map
                .iter()
                .map(|(k, v)| {
                    let name = k.as_str().ok_or("variable names must be strings")?;
                    let template = scalar_string(v)
                        .ok_or_else(|| format!("value of {:?} must be a scalar", name))?;
                    Ok((name.to_string(), template))
                })
                .collect::<FieldResult<Vec<_>>>()?;
            Step::SetOutput { vars }
        }
        "render" => Step::Render {
            source: shorthand_string(value, "source")?,
        },
        "exec" => {
            let commands = match value {
                Value::Mapping(map) => string_or_list(
                    map.get("commands")
                        .ok_or("missing required property \"commands\"")?,
                )?,
                other => string_or_list(other)?,
            };
            Step::Exec { commands }
        }
        "do" => Step::Do {
            action: shorthand_string(value, "action")?,
        },
        other => return Err(format!("unknown step type {:?}", other)),
    };
    Ok(step)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_mapping(value: &Value) -> FieldResult<&Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| "expected a mapping".to_string())
}

fn required_string(map: &Mapping, key: &str) -> FieldResult<String> {
    let value = map
        .get(key)
        .ok_or_else(|| format!("missing required property {:?}", key))?;
    scalar_string(value).ok_or_else(|| format!("property {:?} must be a string", key))
}

fn optional_string(map: &Mapping, key: &str) -> FieldResult<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => {
            scalar_string(value).ok_or_else(|| format!("property {:?} must be a string", key))
        }
    }
}

fn optional_bool(map: &Mapping, key: &str) -> FieldResult<bool> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s == "true" || s == "false" => Ok(s == "true"),
        Some(_) => Err(format!("property {:?} must be a boolean", key)),
    }
}

fn required_list<'a>(map: &'a Mapping, key: &str) -> FieldResult<&'a Vec<Value>> {
    match map.get(key) {
        Some(Value::Sequence(list)) => Ok(list),
        Some(_) => Err(format!("property {:?} must be a list", key)),
        None => Err(format!("missing required property {:?}", key)),
    }
}

/// A bare string, or a mapping holding the string under `key`.
fn shorthand_string(value: &Value, key: &str) -> FieldResult<String> {
    match value {
        Value::Mapping(map) => required_string(map, key),
        other => scalar_string(other).ok_or_else(|| format!("expected a string or {{{}: ...}}", key)),
    }
}

fn string_or_list(value: &Value) -> FieldResult<Vec<String>> {
    match value {
        Value::Sequence(list) => list
            .iter()
            .map(|item| scalar_string(item).ok_or_else(|| "commands must be strings".to_string()))
            .collect(),
        other => scalar_string(other)
            .map(|s| vec![s])
            .ok_or_else(|| "expected a string or a list of strings".to_string()),
    }
}
