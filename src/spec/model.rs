//! Spec data model: actions, steps and the action registry.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{JigError, Result};

/// A loaded `spec.yaml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Placeholder token → value template.
    pub placeholders: BTreeMap<String, String>,
    pub actions: ActionRegistry,
}

/// A named, ordered list of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub steps: Vec<Step>,
}

/// One entry of a multi-option prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub text: String,
    pub var: String,
    pub default: bool,
}

/// One selectable value of a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceItem {
    pub text: String,
    pub value: String,
}

/// A single instruction of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run `then` when `condition` evaluates true.
    If { condition: String, then: Vec<Step> },
    /// Free-text question bound as a string.
    Prompt {
        question: String,
        var: String,
        default: String,
    },
    /// Yes/no question bound as a bool.
    OptionPrompt {
        question: String,
        var: String,
        default: bool,
    },
    /// Several toggles, each bound as a bool under its own variable.
    MultiOptionPrompt {
        question: String,
        items: Vec<OptionItem>,
    },
    /// Pick one of `items`; the chosen item's value is bound.
    ChoicePrompt {
        question: String,
        var: String,
        default: String,
        items: Vec<ChoiceItem>,
    },
    /// Bind each variable to its rendered value template, in order.
    SetOutput { vars: Vec<(String, String)> },
    /// Render `template_dir/source` into the project dir.
    Render { source: String },
    /// Run shell commands in the project dir.
    Exec { commands: Vec<String> },
    /// Run another action with the same context.
    Do { action: String },
}

impl Step {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Step::If { .. } => "if",
            Step::Prompt { .. } => "input",
            Step::OptionPrompt { .. } => "option",
            Step::MultiOptionPrompt { .. } => "options",
            Step::ChoicePrompt { .. } => "choice",
            Step::SetOutput { .. } => "set",
            Step::Render { .. } => "render",
            Step::Exec { .. } => "exec",
            Step::Do { .. } => "do",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::If { condition, .. } => write!(f, "if {}", condition),
            Step::Prompt { var, .. }
            | Step::OptionPrompt { var, .. }
            | Step::ChoicePrompt { var, .. } => write!(f, "{} {}", self.kind(), var),
            Step::MultiOptionPrompt { items, .. } => {
                let vars: Vec<&str> = items.iter().map(|i| i.var.as_str()).collect();
                write!(f, "options {}", vars.join(","))
            }
            Step::SetOutput { vars } => {
                let names: Vec<&str> = vars.iter().map(|(name, _)| name.as_str()).collect();
                write!(f, "set {}", names.join(","))
            }
            Step::Render { source } => write!(f, "render {}", source),
            Step::Exec { commands } => write!(f, "exec {}", commands.join("; ")),
            Step::Do { action } => write!(f, "do {}", action),
        }
    }
}

/// Read-only name → action lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action, replacing any previous one with the same name.
    pub fn insert(&mut self, action: Action) {
        self.actions.insert(action.name.clone(), action);
    }

    /// Look up an action by name.
    pub fn lookup(&self, name: &str) -> Result<&Action> {
        self.actions
            .get(name)
            .ok_or_else(|| JigError::UnknownAction(name.to_string()))
    }

    /// Action names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut registry = Self::new();
        for action in iter {
            registry.insert(action);
        }
        registry
    }
}
