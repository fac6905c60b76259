//! Walking a template directory into an ordered entry list.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use super::name::{ResolvedName, resolve_segment_name};
use super::{Entry, RenderMode};
use crate::context::Context;
use crate::error::{JigError, Result};
use crate::fs::join_within;

/// Collect the entries for every file under `input_dir`.
///
/// Children are visited in byte-wise file name order so the result is
/// deterministic. `inherited` is the mode applied to unmarked children;
/// entries never carry [`RenderMode::Default`].
pub fn collect_entries(
    ctx: &Context,
    input_dir: &Path,
    output_dir: &Path,
    inherited: RenderMode,
) -> Result<Vec<Entry>> {
    let mut children: Vec<_> = fs::read_dir(input_dir)
        .map_err(|e| JigError::io("read directory", input_dir, e))?
        .collect::<std::io::Result<_>>()
        .map_err(|e| JigError::io("read directory", input_dir, e))?;
    children.sort_by_key(|child| child.file_name());

    let mut entries = Vec::new();
    for child in children {
        let input = child.path();
        let raw_name = child.file_name().into_string().map_err(|_| {
            JigError::io(
                "read file name of",
                &input,
                io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
            )
        })?;

        let (name, marked) = match resolve_segment_name(ctx, &raw_name)? {
            ResolvedName::Excluded => {
                debug!(path = %input.display(), "excluded by condition");
                continue;
            }
            ResolvedName::Included { name, mode } => (name, mode),
        };

        let mode = match marked {
            RenderMode::Default => inherited,
            other => other,
        };
        // A resolved name may contain `/` but must stay under `output_dir`.
        let output = join_within(output_dir, &name).map_err(|source| JigError::NameError {
            name: raw_name.clone(),
            source: Box::new(source),
        })?;

        let file_type = child
            .file_type()
            .map_err(|e| JigError::io("inspect", &input, e))?;
        // Follow symlinks so a linked directory is walked like a real one.
        let is_dir = file_type.is_dir() || (file_type.is_symlink() && input.is_dir());

        if is_dir {
            let child_mode = match marked {
                RenderMode::Template | RenderMode::Copy => marked,
                RenderMode::Default | RenderMode::Insert => inherited,
            };
            entries.extend(collect_entries(ctx, &input, &output, child_mode)?);
        } else if name.is_empty() {
            debug!(path = %input.display(), "file name resolved empty, skipping");
        } else {
            entries.push(Entry {
                input,
                output,
                mode,
            });
        }
    }
    Ok(entries)
}
