//! CLI argument parsing for jig.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; implementations live in the
//! `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};

/// Jig: project scaffolding engine and script runner.
///
/// Templates describe actions in a `spec.yaml`: prompts, conditional
/// rendering of file trees, and shell commands. Answers are kept in the
/// project's `jig.yaml` so maintenance actions can reuse them later.
#[derive(Parser, Debug)]
#[command(name = "jig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Display verbose messages.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Name of the template to use (defaults to the project's or a prompt).
    #[arg(short, long, global = true, value_name = "NAME")]
    pub template: Option<String>,

    /// Skip all prompts, answering with defaults.
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Set a project variable (repeatable); `true`/`false` become booleans.
    #[arg(
        short,
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        action = ArgAction::Append,
        value_parser = parse_key_value
    )]
    pub set: Vec<(String, String)>,
}

/// Available commands for jig.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an action of the project's template.
    ///
    /// In a directory without a jig.yaml this creates a new project; the
    /// answers and template name are saved to jig.yaml afterwards.
    Do(DoArgs),

    /// Run a shell command in the project with its variables exported.
    Exec(ExecArgs),

    /// Start an interactive shell in the project with its variables exported.
    Shell,

    /// Clone or update the template repository.
    Pull,
}

/// Arguments for the `do` command.
#[derive(Args, Debug)]
pub struct DoArgs {
    /// Action to run (prompted for when omitted).
    pub action: Option<String>,
}

/// Arguments for the `exec` command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command and arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {:?}", raw)),
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
