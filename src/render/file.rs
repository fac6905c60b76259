//! Writing a single entry to disk.

use std::fs;
use std::io;
use tracing::debug;

use super::Entry;
use crate::context::Context;
use crate::error::{JigError, Result};
use crate::eval::eval_template;
use crate::fs::{copy_permissions, ensure_parent_dir};

/// Produce `entry.output` from `entry.input` according to its mode.
///
/// Copies are byte-for-byte; rendered files must be UTF-8 text and keep the
/// source's permissions. Existing destination files are overwritten.
pub fn materialize(ctx: &Context, entry: &Entry) -> Result<()> {
    debug!(
        input = %entry.input.display(),
        output = %entry.output.display(),
        mode = ?entry.mode,
        "writing entry"
    );
    ensure_parent_dir(&entry.output)?;

    if !entry.mode.renders() {
        fs::copy(&entry.input, &entry.output).map_err(|e| JigError::io("copy", &entry.input, e))?;
        return Ok(());
    }

    let wrap = |source: JigError| JigError::RenderError {
        path: entry.input.clone(),
        source: Box::new(source),
    };
    let bytes = fs::read(&entry.input).map_err(|e| JigError::io("read template", &entry.input, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let message = format!(
            "template is not valid UTF-8 (first bad byte at offset {})",
            e.utf8_error().valid_up_to()
        );
        wrap(JigError::io(
            "decode",
            &entry.input,
            io::Error::new(io::ErrorKind::InvalidData, message),
        ))
    })?;
    let rendered = eval_template(ctx, &text).map_err(wrap)?;
    fs::write(&entry.output, rendered).map_err(|e| JigError::io("write", &entry.output, e))?;
    copy_permissions(&entry.input, &entry.output)?;
    Ok(())
}
