//! Implementation of the `jig do` command.
//!
//! # What `jig do` does
//!
//! 1. Locates the project by walking up from the current directory for
//!    `jig.yaml`; without one, the current directory becomes a new project
//! 2. Picks the template: `--template`, then the project file, then a prompt
//! 3. Loads the template's spec and seeds the context from the project file
//!    and `--set` overrides
//! 4. Runs the requested action, prompting for one when omitted
//! 5. Saves the template name and all variables back to `jig.yaml`

use std::path::Path;
use tracing::info;

use super::{apply_overrides, current_dir};
use crate::cli::{DoArgs, GlobalArgs};
use crate::context::Context;
use crate::error::{JigError, Result};
use crate::project::{PROJECT_FILE_NAME, ProjectFile, find_project_dir};
use crate::settings::Settings;
use crate::spec::Spec;
use crate::steps::{Interpreter, Prompter, ShellRunner, SystemShell, TerminalPrompter};

/// Execute the `jig do` command.
pub fn cmd_do(global: &GlobalArgs, args: DoArgs) -> Result<()> {
    let cwd = current_dir()?;
    let settings = Settings::from_env()?;
    let mut prompter = TerminalPrompter::new();
    let mut shell = SystemShell::new();

    let project_dir = run_do(
        &cwd,
        &settings,
        global,
        args.action.as_deref(),
        &mut prompter,
        &mut shell,
    )?;

    println!("Project saved to {}", project_dir.join(PROJECT_FILE_NAME).display());
    Ok(())
}

/// Run an action for the project enclosing `cwd` and save the project file.
///
/// Returns the project directory.
pub(crate) fn run_do(
    cwd: &Path,
    settings: &Settings,
    global: &GlobalArgs,
    action: Option<&str>,
    prompter: &mut dyn Prompter,
    shell: &mut dyn ShellRunner,
) -> Result<std::path::PathBuf> {
    let (project_dir, existing) = match find_project_dir(cwd) {
        Some(dir) => {
            let project = ProjectFile::load(dir.join(PROJECT_FILE_NAME))?;
            (dir, Some(project))
        }
        None => (cwd.to_path_buf(), None),
    };

    let template = select_template(settings, global, existing.as_ref(), prompter)?;
    let template_dir = settings.template_dir(&template)?;
    let spec = Spec::load(&template_dir)?;

    let mut ctx = Context::new(&template_dir, &project_dir).with_placeholders(spec.placeholders.clone());
    if let Some(project) = existing {
        ctx.vars = project.vars;
    }
    apply_overrides(&mut ctx, global);

    let action = match action {
        Some(action) => action.to_string(),
        None => select_action(&spec, global, prompter)?,
    };

    info!(template = %template, action = %action, project = %project_dir.display(), "running action");
    Interpreter::new(&spec.actions, &mut *prompter, &mut *shell)
        .skip_confirm(global.yes)
        .run_named(&mut ctx, &action)?;

    ProjectFile::new(template, ctx.vars).save(project_dir.join(PROJECT_FILE_NAME))?;
    info!(action = %action, "action finished");
    Ok(project_dir)
}

fn select_template(
    settings: &Settings,
    global: &GlobalArgs,
    existing: Option<&ProjectFile>,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    if let Some(template) = &global.template {
        return Ok(template.clone());
    }
    if let Some(project) = existing {
        return Ok(project.template.clone());
    }

    let templates = settings.list_templates()?;
    match templates.len() {
        0 => Err(JigError::UserError(format!(
            "no templates found in '{}'.\n\n\
             Run `jig pull` to fetch the template repository.",
            settings.templates_dir().display()
        ))),
        1 => Ok(templates[0].clone()),
        _ if global.yes => Err(JigError::UserError(
            "several templates are available; choose one with --template".to_string(),
        )),
        _ => {
            let index = prompter.select("Template", &templates, 0)?;
            templates
                .get(index)
                .cloned()
                .ok_or_else(|| JigError::PromptError(format!("no template at index {}", index)))
        }
    }
}

fn select_action(spec: &Spec, global: &GlobalArgs, prompter: &mut dyn Prompter) -> Result<String> {
    let names: Vec<String> = spec.actions.names().into_iter().map(String::from).collect();
    match names.len() {
        0 => Err(JigError::UserError(format!(
            "template {:?} defines no actions",
            spec.name
        ))),
        1 => Ok(names[0].clone()),
        _ if global.yes => Err(JigError::UserError(format!(
            "no action given; available actions: {}",
            names.join(", ")
        ))),
        _ => {
            let index = prompter.select("Action", &names, 0)?;
            names
                .get(index)
                .cloned()
                .ok_or_else(|| JigError::PromptError(format!("no action at index {}", index)))
        }
    }
}
