//! Rendering a template directory into the project tree.
//!
//! Rendering happens in two passes: [`collect_entries`] walks the source
//! tree and resolves every path segment (conditions, interpolation, mode
//! markers), then [`materialize`] writes each resulting [`Entry`].

mod entries;
mod file;
mod name;

#[cfg(test)]
mod tests;

pub use entries::collect_entries;
pub use file::materialize;
pub use name::{ResolvedName, resolve_segment_name};

use crate::context::Context;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// How a file's content is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// No marker: use the mode inherited from the parent directory.
    Default,
    /// `.tmpl`: render as a template, and so do descendants.
    Template,
    /// `.notmpl`: copy verbatim, and so do descendants.
    Copy,
    /// `.insert`: render this one entry as a template; children are unaffected.
    Insert,
}

impl RenderMode {
    /// Whether content is run through the template engine.
    pub fn renders(self) -> bool {
        matches!(self, RenderMode::Template | RenderMode::Insert)
    }
}

/// One source file mapped to its destination.
///
/// The mode is always resolved; entries never carry [`RenderMode::Default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: RenderMode,
}

/// Render every file under `input_dir` into `output_dir`.
///
/// Files without a marker are copied. Returns the entries written.
pub fn render_dir(ctx: &Context, input_dir: &Path, output_dir: &Path) -> Result<Vec<Entry>> {
    info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        "rendering directory"
    );
    let entries = collect_entries(ctx, input_dir, output_dir, RenderMode::Copy)?;
    for entry in &entries {
        materialize(ctx, entry)?;
    }
    Ok(entries)
}
