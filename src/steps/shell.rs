//! Shell command execution for `exec` steps.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

use crate::error::{JigError, Result};

/// Runs shell commands on behalf of `exec` steps.
pub trait ShellRunner {
    /// Run `commands` in order inside `dir` with exactly the `KEY=VALUE`
    /// environment in `env`. Stops at the first failing command.
    fn run(&mut self, commands: &[String], env: &[String], dir: &Path) -> Result<()>;
}

/// Runs commands through `bash -c`, or `sh -c` where bash is missing.
///
/// Standard streams are inherited so commands can interact with the user.
#[derive(Debug, Default)]
pub struct SystemShell;

impl SystemShell {
    pub fn new() -> Self {
        Self
    }

    fn spawn(program: &str, command: &str, env: &[String], dir: &Path) -> std::io::Result<ExitStatus> {
        Command::new(program)
            .arg("-c")
            .arg(command)
            .env_clear()
            .envs(split_env(env))
            .current_dir(dir)
            .status()
    }
}

impl ShellRunner for SystemShell {
    fn run(&mut self, commands: &[String], env: &[String], dir: &Path) -> Result<()> {
        for command in commands {
            debug!(command = %command, dir = %dir.display(), "running shell command");

            let status = match Self::spawn("bash", command, env, dir) {
                Err(e) if e.kind() == ErrorKind::NotFound => Self::spawn("sh", command, env, dir),
                other => other,
            }
            .map_err(|e| JigError::ShellError {
                command: command.clone(),
                reason: format!("failed to start shell: {}", e),
            })?;

            if !status.success() {
                return Err(JigError::ShellError {
                    command: command.clone(),
                    reason: status.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Split `KEY=VALUE` strings; entries without `=` are dropped.
pub(crate) fn split_env(env: &[String]) -> impl Iterator<Item = (&str, &str)> {
    env.iter().filter_map(|pair| pair.split_once('='))
}
