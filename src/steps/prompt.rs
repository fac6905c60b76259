//! Interactive prompting.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::error::{JigError, Result};

/// Source of answers for prompt steps.
pub trait Prompter {
    /// Ask for free text.
    fn text(&mut self, message: &str, default: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Toggle several items; returns one bool per item, in order.
    fn multi_select(&mut self, message: &str, items: &[(String, bool)]) -> Result<Vec<bool>>;

    /// Pick one item; returns its index.
    fn select(&mut self, message: &str, items: &[String], default: usize) -> Result<usize>;
}

/// Prompts on the terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn prompt_error(e: dialoguer::Error) -> JigError {
    JigError::PromptError(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, message: &str, default: &str) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(&mut self, message: &str, items: &[(String, bool)]) -> Result<Vec<bool>> {
        let texts: Vec<&str> = items.iter().map(|(text, _)| text.as_str()).collect();
        let defaults: Vec<bool> = items.iter().map(|(_, checked)| *checked).collect();

        let chosen = MultiSelect::with_theme(&self.theme)
            .with_prompt(message)
            .items(&texts)
            .defaults(&defaults)
            .interact()
            .map_err(prompt_error)?;

        Ok((0..items.len()).map(|i| chosen.contains(&i)).collect())
    }

    fn select(&mut self, message: &str, items: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}
