//! Command implementations for jig.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the project lookup shared by the commands that
//! operate on an existing project.

mod do_cmd;
mod exec;
mod pull;
mod shell;

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cli::{Command, GlobalArgs};
use crate::context::{Context, typed_value};
use crate::error::{JigError, Result};
use crate::fs::join_within;
use crate::project::{PROJECT_FILE_NAME, ProjectFile, find_project_dir};
use crate::settings::Settings;

/// Dispatch a command to its implementation.
pub fn dispatch(global: GlobalArgs, command: Command) -> Result<()> {
    match command {
        Command::Do(args) => do_cmd::cmd_do(&global, args),
        Command::Exec(args) => exec::cmd_exec(&global, args),
        Command::Shell => shell::cmd_shell(&global),
        Command::Pull => pull::cmd_pull(),
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(|e| JigError::io("read current directory", ".", e))
}

/// Apply `--set KEY=VALUE` overrides on top of whatever the context holds.
fn apply_overrides(ctx: &mut Context, global: &GlobalArgs) {
    for (key, value) in &global.set {
        debug!(var = %key, value = %value, "override");
        ctx.set(key.clone(), typed_value(value));
    }
}

/// Context of the project enclosing `cwd`: its saved variables plus
/// overrides. Fails when no `jig.yaml` is found.
fn existing_project_context(cwd: &Path, settings: &Settings, global: &GlobalArgs) -> Result<Context> {
    let project_dir = find_project_dir(cwd).ok_or_else(|| {
        JigError::UserError(format!(
            "no {} found in '{}' or any parent directory.\n\n\
             Run `jig do` to create a project first.",
            PROJECT_FILE_NAME,
            cwd.display()
        ))
    })?;
    let project = ProjectFile::load(project_dir.join(PROJECT_FILE_NAME))?;

    let template = global.template.as_deref().unwrap_or(&project.template);
    let template_dir = join_within(&settings.templates_dir(), template)?;
    if !template_dir.is_dir() {
        warn!(
            template = %template,
            dir = %template_dir.display(),
            "template not found locally; its bin directory will be missing from PATH"
        );
    }

    let mut ctx = Context::new(template_dir, project_dir);
    ctx.vars = project.vars;
    apply_overrides(&mut ctx, global);
    Ok(ctx)
}
