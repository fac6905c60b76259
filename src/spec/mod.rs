//! Template specs: the `spec.yaml` at the root of every template.
//!
//! A spec names the template, defines placeholders, and maps action names
//! to step lists. It is loaded once per run and never mutated.

mod loader;
mod model;

#[cfg(test)]
mod tests;

pub use loader::{SPEC_FILE_NAME, SPEC_VERSION};
pub use model::{Action, ActionRegistry, ChoiceItem, OptionItem, Spec, Step};
