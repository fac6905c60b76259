//! Error types for the jig CLI.
//!
//! Uses thiserror for derive macros. Every layer wraps the error it receives
//! with positional context (expression, path segment, step index, action) so
//! the printed chain localizes the fault without losing the cause.

use crate::exit_codes;
use crate::template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for jig operations.
#[derive(Error, Debug)]
pub enum JigError {
    /// User provided invalid arguments, configuration, or the project is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Template text could not be parsed.
    #[error("parse template {text:?}: {source}")]
    ParseError { text: String, source: TemplateError },

    /// Template parsed but failed while executing.
    #[error("evaluate template {text:?}: {source}")]
    EvalError { text: String, source: TemplateError },

    /// A boolean expression could not be evaluated.
    #[error("evaluate expression {expression:?}: {source}")]
    ExpressionError {
        expression: String,
        source: Box<JigError>,
    },

    /// A file or directory name could not be resolved.
    #[error("resolve name {name:?}: {source}")]
    NameError { name: String, source: Box<JigError> },

    /// A template file failed to render.
    #[error("render '{}': {source}", path.display())]
    RenderError {
        path: PathBuf,
        source: Box<JigError>,
    },

    /// Filesystem operation failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    IoError {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A `do` step (or the command line) referenced an action missing from the spec file.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// A step object in the spec file matched none (or several) of the known shapes.
    #[error("action {action:?} step #{index}: unsupported step: {reason}")]
    UnsupportedStep {
        action: String,
        index: usize,
        reason: String,
    },

    /// A shell command exited unsuccessfully or could not be launched.
    #[error("command {command:?} failed: {reason}")]
    ShellError { command: String, reason: String },

    /// An action invoked itself, directly or through other actions.
    #[error("action cycle detected: {0}")]
    ActionCycle(String),

    /// Interactive prompt failed.
    #[error("prompt failed: {0}")]
    PromptError(String),

    /// A step failed; carries the 1-based step index and the enclosing scope.
    #[error("step #{index} of {scope}: {source}")]
    StepError {
        scope: String,
        index: usize,
        source: Box<JigError>,
    },
}

impl JigError {
    /// Build an `IoError` for the given operation and path.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JigError::IoError {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    ///
    /// Wrapping variants report the exit code of the error they wrap.
    pub fn exit_code(&self) -> i32 {
        match self {
            JigError::UserError(_)
            | JigError::UnknownAction(_)
            | JigError::UnsupportedStep { .. }
            | JigError::ActionCycle(_) => exit_codes::USER_ERROR,
            JigError::ParseError { .. } | JigError::EvalError { .. } | JigError::IoError { .. } => {
                exit_codes::RENDER_FAILURE
            }
            JigError::ShellError { .. } => exit_codes::SHELL_FAILURE,
            JigError::PromptError(_) => exit_codes::PROMPT_FAILURE,
            JigError::ExpressionError { source, .. }
            | JigError::NameError { source, .. }
            | JigError::RenderError { source, .. }
            | JigError::StepError { source, .. } => source.exit_code(),
        }
    }

    /// The innermost error, skipping positional wrappers.
    pub fn root_cause(&self) -> &JigError {
        match self {
            JigError::ExpressionError { source, .. }
            | JigError::NameError { source, .. }
            | JigError::RenderError { source, .. }
            | JigError::StepError { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for jig operations.
pub type Result<T> = std::result::Result<T, JigError>;
