//! Step interpreter.
//!
//! Runs an action's steps in order against a shared [`Context`]. Prompts
//! and shell commands go through the [`Prompter`] and [`ShellRunner`]
//! traits so callers decide how the outside world is reached.
//!
//! Errors abort the run. Each level wraps the failure with the 1-based step
//! index and the enclosing scope, so a failure three actions deep reads as
//! a chain of `step #N of action "..."` prefixes. Files already written
//! are left in place.

pub mod prompt;
pub mod shell;


pub use prompt::{Prompter, TerminalPrompter};
pub use shell::{ShellRunner, SystemShell};

use serde_json::Value;
use tracing::{debug, info};

use crate::context::{Context, typed_value};
use crate::error::{JigError, Result};
use crate::eval::{eval_bool_expression, eval_template};
use crate::fs::join_within;
use crate::render::render_dir;
use crate::spec::{Action, ActionRegistry, ChoiceItem, OptionItem, Step};

/// Executes actions from a registry.
pub struct Interpreter<'a> {
    registry: &'a ActionRegistry,
    prompter: &'a mut dyn Prompter,
    shell: &'a mut dyn ShellRunner,
    skip_confirm: bool,
    /// Actions currently executing, outermost first.
    call_stack: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        registry: &'a ActionRegistry,
        prompter: &'a mut dyn Prompter,
        shell: &'a mut dyn ShellRunner,
    ) -> Self {
        Self {
            registry,
            prompter,
            shell,
            skip_confirm: false,
            call_stack: Vec::new(),
        }
    }

    /// Answer every prompt with its declared default.
    pub fn skip_confirm(mut self, skip: bool) -> Self {
        self.skip_confirm = skip;
        self
    }

    /// Look up an action by name and run it.
    pub fn run_named(&mut self, ctx: &mut Context, name: &str) -> Result<()> {
        let registry = self.registry;
        let action = registry.lookup(name)?;
        self.run_action(ctx, action)
    }

    /// Run every step of `action`.
    ///
    /// Fails with [`JigError::ActionCycle`] if the action is already running.
    pub fn run_action(&mut self, ctx: &mut Context, action: &Action) -> Result<()> {
        if self.call_stack.iter().any(|name| *name == action.name) {
            let mut chain = self.call_stack.clone();
            chain.push(action.name.clone());
            return Err(JigError::ActionCycle(chain.join(" -> ")));
        }

        info!(action = %action.name, "running action");
        self.call_stack.push(action.name.clone());
        let result = self.run_steps(ctx, &action.steps, &format!("action {:?}", action.name));
        self.call_stack.pop();
        result?;
        info!(action = %action.name, "action finished");
        Ok(())
    }

    /// Run `steps` in order; `scope` names the enclosing block in errors.
    pub fn run_steps(&mut self, ctx: &mut Context, steps: &[Step], scope: &str) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            debug!(scope, index, step = %step, "running step");
            self.run_step(ctx, step).map_err(|e| JigError::StepError {
                scope: scope.to_string(),
                index,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    fn run_step(&mut self, ctx: &mut Context, step: &Step) -> Result<()> {
        match step {
            Step::If { condition, then } => {
                if eval_bool_expression(ctx, condition)? {
                    self.run_steps(ctx, then, "\"if\" block")
                } else {
                    debug!(condition = %condition, "condition false, skipping");
                    Ok(())
                }
            }
            Step::Prompt {
                question,
                var,
                default,
            } => {
                if self.already_set(ctx, var) {
                    return Ok(());
                }
                let default = eval_template(ctx, default)?;
                let answer = if self.skip_confirm {
                    default
                } else {
                    self.prompter.text(question, &default)?
                };
                ctx.set(var.as_str(), Value::String(answer));
                Ok(())
            }
            Step::OptionPrompt {
                question,
                var,
                default,
            } => {
                if self.already_set(ctx, var) {
                    return Ok(());
                }
                let answer = if self.skip_confirm {
                    *default
                } else {
                    self.prompter.confirm(question, *default)?
                };
                ctx.set(var.as_str(), Value::Bool(answer));
                Ok(())
            }
            Step::MultiOptionPrompt { question, items } => self.multi_option(ctx, question, items),
            Step::ChoicePrompt {
                question,
                var,
                default,
                items,
            } => self.choice(ctx, question, var, default, items),
            Step::SetOutput { vars } => {
                for (name, template) in vars {
                    let value = eval_template(ctx, template)?;
                    debug!(var = %name, value = %value, "set");
                    ctx.set(name.as_str(), typed_value(&value));
                }
                Ok(())
            }
            Step::Render { source } => {
                let input = join_within(&ctx.template_dir, source)?;
                let output = ctx.project_dir.clone();
                let entries = render_dir(ctx, &input, &output)?;
                info!(source = %source, files = entries.len(), "rendered");
                Ok(())
            }
            Step::Exec { commands } => {
                let env = ctx.shell_vars(true);
                self.shell.run(commands, &env, &ctx.project_dir)
            }
            Step::Do { action } => self.run_named(ctx, action),
        }
    }

    fn already_set(&self, ctx: &Context, var: &str) -> bool {
        let set = ctx.contains(var);
        if set {
            debug!(var, "already set, skipping prompt");
        }
        set
    }

    fn multi_option(&mut self, ctx: &mut Context, question: &str, items: &[OptionItem]) -> Result<()> {
        if items.iter().all(|item| ctx.contains(&item.var)) {
            debug!(question, "all options already set, skipping prompt");
            return Ok(());
        }

        // Known values pre-check their boxes.
        let choices: Vec<(String, bool)> = items
            .iter()
            .map(|item| {
                let checked = match ctx.get(&item.var) {
                    Some(value) => crate::template::is_truthy(value),
                    None => item.default,
                };
                (item.text.clone(), checked)
            })
            .collect();

        let answers = if self.skip_confirm {
            choices.iter().map(|(_, checked)| *checked).collect()
        } else {
            self.prompter.multi_select(question, &choices)?
        };
        if answers.len() != items.len() {
            return Err(JigError::PromptError(format!(
                "expected {} answers, got {}",
                items.len(),
                answers.len()
            )));
        }

        for (item, answer) in items.iter().zip(answers) {
            ctx.set(item.var.as_str(), Value::Bool(answer));
        }
        Ok(())
    }

    fn choice(
        &mut self,
        ctx: &mut Context,
        question: &str,
        var: &str,
        default: &str,
        items: &[ChoiceItem],
    ) -> Result<()> {
        if self.already_set(ctx, var) {
            return Ok(());
        }
        let default_index = items
            .iter()
            .position(|item| item.value == default)
            .unwrap_or(0);

        let index = if self.skip_confirm {
            default_index
        } else {
            let texts: Vec<String> = items.iter().map(|item| item.text.clone()).collect();
            self.prompter.select(question, &texts, default_index)?
        };
        let item = items.get(index).ok_or_else(|| {
            JigError::PromptError(format!("choice index {} out of range", index))
        })?;

        ctx.set(var, Value::String(item.value.clone()));
        Ok(())
    }
}
