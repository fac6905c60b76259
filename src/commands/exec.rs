//! Implementation of the `jig exec` command.
//!
//! Runs a single command in the project directory with the project's
//! variables exported, the same environment `exec` steps see.

use super::{current_dir, existing_project_context};
use crate::cli::{ExecArgs, GlobalArgs};
use crate::context::Context;
use crate::error::Result;
use crate::settings::Settings;
use crate::steps::{ShellRunner, SystemShell};

/// Execute the `jig exec` command.
pub fn cmd_exec(global: &GlobalArgs, args: ExecArgs) -> Result<()> {
    let cwd = current_dir()?;
    let settings = Settings::from_env()?;
    let ctx = existing_project_context(&cwd, &settings, global)?;

    run_exec(&ctx, &args.command, &mut SystemShell::new())
}

fn run_exec(ctx: &Context, argv: &[String], shell: &mut dyn ShellRunner) -> Result<()> {
    let command = shell_words::join(argv);
    shell.run(&[command], &ctx.shell_vars(true), &ctx.project_dir)
}
