//! Text template engine used for file contents, file names and conditions.
//!
//! The syntax follows Go's `text/template`, which is what template authors
//! already write for this kind of tool:
//!
//! ```text
//! Hello {{.NAME | upper}}!
//! {{- if .DB}}
//! database: {{default "postgres" .DB_KIND}}
//! {{- end}}
//! {{range $i, $svc := .SERVICES}}{{$i}}={{$svc}} {{end}}
//! ```
//!
//! # Syntax
//!
//! - `{{pipeline}}` prints the value of the pipeline
//! - `{{if p}} … {{else if q}} … {{else}} … {{end}}`
//! - `{{range p}} … {{else}} … {{end}}`, with optional `$i, $v :=`
//! - `{{with p}} … {{else}} … {{end}}`
//! - `{{/* comment */}}`
//! - `{{- ` / ` -}}` trim surrounding whitespace
//! - operands: `.`, `.A.B`, `$`, `$x.A`, `"str"`, `` `raw` ``, numbers,
//!   `true`, `false`, `nil`, `(pipeline)`, function calls
//!
//! Data is a `serde_json::Value`; missing map keys evaluate to nil, which
//! prints as the empty string.

mod exec;
mod funcs;
mod lexer;
mod parser;


use serde_json::Value;
use std::fmt;

pub use funcs::{display, is_truthy};

/// Error type for template parsing and execution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template text is malformed.
    Parse {
        /// Name of the template being parsed.
        name: String,
        /// 1-based line of the offending token.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// The template is well formed but failed while executing.
    Exec {
        /// Name of the template being executed.
        name: String,
        /// 1-based line of the failing action.
        line: usize,
        /// Description of the problem.
        message: String,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Parse {
                name,
                line,
                message,
            } => write!(f, "template: {}:{}: {}", name, line, message),
            TemplateError::Exec {
                name,
                line,
                message,
            } => write!(f, "template: {}:{}: executing: {}", name, line, message),
        }
    }
}

impl std::error::Error for TemplateError {}

/// A parsed template, ready to be executed any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<parser::Node>,
}

impl Template {
    /// Parse template text.
    ///
    /// `name` only appears in error messages.
    pub fn parse(name: &str, text: &str) -> Result<Self, TemplateError> {
        let parse_error = |line: usize, message: String| TemplateError::Parse {
            name: name.to_string(),
            line,
            message,
        };

        let tokens = lexer::lex(text).map_err(|(line, message)| parse_error(line, message))?;
        let nodes =
            parser::parse(tokens).map_err(|(line, message)| parse_error(line, message))?;

        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    /// Execute the template against `data`, returning the rendered text.
    pub fn execute(&self, data: &Value) -> Result<String, TemplateError> {
        exec::execute(&self.nodes, data).map_err(|(line, message)| TemplateError::Exec {
            name: self.name.clone(),
            line,
            message,
        })
    }

    /// Name given at parse time.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Parse and execute in one go.
pub fn render(name: &str, text: &str, data: &Value) -> Result<String, TemplateError> {
    Template::parse(name, text)?.execute(data)
}
