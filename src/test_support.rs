use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::context::Context;
use crate::error::{JigError, Result};
use crate::render::{Entry, RenderMode};
use crate::steps::{Prompter, ShellRunner};

/// Create a temp dir containing `files` (relative path → content).
pub(crate) fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_tree(temp_dir.path(), files);
    temp_dir
}

/// Write `files` under `root`, creating directories as needed.
pub(crate) fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }
}

/// A template dir with `spec.yaml` and the given extra files, plus an empty
/// project dir next to it.
pub(crate) fn create_template(spec_yaml: &str, files: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let template_dir = temp_dir.path().join("template");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir_all(&template_dir).unwrap();
    fs::create_dir_all(&project_dir).unwrap();
    fs::write(template_dir.join("spec.yaml"), spec_yaml).unwrap();
    write_tree(&template_dir, files);
    (temp_dir, template_dir, project_dir)
}

pub(crate) fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

/// Entries as `(input, output, mode)` with paths relative to the walk roots.
pub(crate) fn relative_entries(
    entries: &[Entry],
    input_root: &Path,
    output_root: &Path,
) -> Vec<(String, String, RenderMode)> {
    entries
        .iter()
        .map(|entry| {
            (
                entry.input.strip_prefix(input_root).unwrap().to_string_lossy().into_owned(),
                entry.output.strip_prefix(output_root).unwrap().to_string_lossy().into_owned(),
                entry.mode,
            )
        })
        .collect()
}

/// Context used by tree-walking tests.
pub(crate) fn sample_context(template_dir: &Path, project_dir: &Path) -> Context {
    let mut ctx = Context::new(template_dir, project_dir);
    ctx.set("VAR1", serde_json::json!("value1"));
    ctx.set("VAR2", serde_json::json!("value2"));
    ctx.set("TRUE_VAR", serde_json::json!(true));
    ctx.set("FALSE_VAR", serde_json::json!(false));
    ctx.set("EMPTY_VAR", serde_json::json!(""));
    ctx
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Answer {
    Text(String),
    Confirm(bool),
    Multi(Vec<bool>),
    Select(usize),
}

/// Replays canned answers and records the questions asked.
#[derive(Default)]
pub(crate) struct ScriptedPrompter {
    pub answers: VecDeque<Answer>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub(crate) fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| JigError::PromptError(format!("no answer for {:?}", message)))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, message: &str, _default: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Text(s) => Ok(s),
            other => panic!("expected text answer, got {:?}", other),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(b) => Ok(b),
            other => panic!("expected confirm answer, got {:?}", other),
        }
    }

    fn multi_select(&mut self, message: &str, _items: &[(String, bool)]) -> Result<Vec<bool>> {
        match self.next(message)? {
            Answer::Multi(v) => Ok(v),
            other => panic!("expected multi answer, got {:?}", other),
        }
    }

    fn select(&mut self, message: &str, _items: &[String], _default: usize) -> Result<usize> {
        match self.next(message)? {
            Answer::Select(i) => Ok(i),
            other => panic!("expected select answer, got {:?}", other),
        }
    }
}

/// Records every command instead of running it; fails on commands listed in `fail_on`.
#[derive(Default)]
pub(crate) struct RecordingShell {
    pub runs: Vec<(Vec<String>, Vec<String>, PathBuf)>,
    pub fail_on: Vec<String>,
}

impl ShellRunner for RecordingShell {
    fn run(&mut self, commands: &[String], env: &[String], dir: &Path) -> Result<()> {
        self.runs
            .push((commands.to_vec(), env.to_vec(), dir.to_path_buf()));
        for command in commands {
            if self.fail_on.contains(command) {
                return Err(JigError::ShellError {
                    command: command.clone(),
                    reason: "exit status: 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
