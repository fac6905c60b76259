//! Git invocation for fetching the template repository.
//!
//! Output is captured; a failing git command becomes a
//! [`JigError::ShellError`] carrying git's stderr.

use crate::error::{JigError, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Captured output of a successful git command.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output (trimmed).
    pub stdout: String,
    /// Standard error (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run `git <args>` in `cwd`.
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    let command = format!("git {}", args.join(" "));
    debug!(command = %command, cwd = %cwd.display(), "running git");

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| JigError::ShellError {
            command: command.clone(),
            reason: format!("failed to execute git: {} (is git installed?)", e),
        })?;

    let git_output = GitOutput::from_output(&output);
    if output.status.success() {
        return Ok(git_output);
    }

    let message = if git_output.stderr.is_empty() {
        git_output.stdout
    } else {
        git_output.stderr
    };
    Err(JigError::ShellError {
        command,
        reason: format!("{}: {}", output.status, message),
    })
}

/// Clone `url` into `dest`, which must not exist yet.
pub fn clone_repo(url: &str, dest: &Path) -> Result<GitOutput> {
    let parent = dest.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| JigError::io("create directory", parent, e))?;
    let dest_str = dest.to_string_lossy();
    run_git(parent, &["clone", url, &dest_str])
}

/// Fast-forward an existing clone.
pub fn pull(repo_dir: &Path) -> Result<GitOutput> {
    run_git(repo_dir, &["pull", "--ff-only"])
}
