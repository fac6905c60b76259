//! Implementation of the `jig shell` command.

use std::env;
use std::process::Command;
use tracing::debug;

use super::{current_dir, existing_project_context};
use crate::cli::GlobalArgs;
use crate::error::{JigError, Result};
use crate::settings::Settings;
use crate::steps::shell::split_env;

const DEFAULT_SHELL: &str = "bash";

/// Execute the `jig shell` command.
///
/// Starts `$SHELL` (or bash) in the project directory with the project's
/// variables exported. Returns once the shell exits.
pub fn cmd_shell(global: &GlobalArgs) -> Result<()> {
    let cwd = current_dir()?;
    let settings = Settings::from_env()?;
    let ctx = existing_project_context(&cwd, &settings, global)?;

    let program = env::var("SHELL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string());
    let env = ctx.shell_vars(true);
    debug!(shell = %program, dir = %ctx.project_dir.display(), "starting shell");

    let status = Command::new(&program)
        .env_clear()
        .envs(split_env(&env))
        .current_dir(&ctx.project_dir)
        .status()
        .map_err(|e| JigError::ShellError {
            command: program.clone(),
            reason: format!("failed to start shell: {}", e),
        })?;

    if !status.success() {
        return Err(JigError::ShellError {
            command: program,
            reason: status.to_string(),
        });
    }
    Ok(())
}
