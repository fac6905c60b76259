//! Implementation of the `jig pull` command.
//!
//! Clones the template repository into the jig home directory on first use
//! and fast-forwards it afterwards.

use tracing::info;

use crate::error::{JigError, Result};
use crate::git;
use crate::settings::{REPO_ENV, Settings};

/// What `pull` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullOutcome {
    Cloned,
    Updated,
}

/// Execute the `jig pull` command.
pub fn cmd_pull() -> Result<()> {
    let settings = Settings::from_env()?;
    match pull_templates(&settings)? {
        PullOutcome::Cloned => println!("Cloned templates into {}", settings.home.display()),
        PullOutcome::Updated => println!("Updated templates in {}", settings.home.display()),
    }

    let templates = settings.list_templates()?;
    if templates.is_empty() {
        println!("No templates found in {}", settings.templates_dir().display());
    } else {
        println!("Available templates: {}", templates.join(", "));
    }
    Ok(())
}

fn pull_templates(settings: &Settings) -> Result<PullOutcome> {
    if settings.home.join(".git").exists() {
        info!(home = %settings.home.display(), "updating template repository");
        git::pull(&settings.home)?;
        return Ok(PullOutcome::Updated);
    }

    let url = settings.repo_url.as_deref().ok_or_else(|| {
        JigError::UserError(format!(
            "no template repository at '{}'.\n\n\
             Set {} to the repository URL and run `jig pull` again.",
            settings.home.display(),
            REPO_ENV
        ))
    })?;
    info!(url = %url, home = %settings.home.display(), "cloning template repository");
    git::clone_repo(url, &settings.home)?;
    Ok(PullOutcome::Cloned)
}
