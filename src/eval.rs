//! Expression evaluation against a run [`Context`].
//!
//! Everything user-supplied that can contain template syntax (file contents,
//! path segments, conditions, `set` values) goes through
//! [`eval_template`] so the escaping and placeholder rules stay uniform.

use crate::context::Context;
use crate::error::{JigError, Result};
use crate::template::Template;

const TRIPLE_OPEN: &str = "{{{";
const TRIPLE_CLOSE: &str = "}}}";
const ESCAPED_OPEN: &str = "{{`{{`}}";
const ESCAPED_CLOSE: &str = "{{`}}`}}";

/// Render `text` as a template against the context variables.
///
/// `{{{` and `}}}` come out as literal `{{` and `}}`. Placeholders are then
/// replaced by their values verbatim, in key order, before the text is
/// parsed. A value such as `{{.PROJECT | lower}}` is therefore rendered
/// once, as part of the surrounding text.
pub fn eval_template(ctx: &Context, text: &str) -> Result<String> {
    let mut text = escape_triple_braces(text);

    for (name, value) in &ctx.placeholders {
        if text.contains(name.as_str()) {
            text = text.replace(name.as_str(), value);
        }
    }

    render(ctx, &text)
}

/// Evaluate a condition such as `.DB` or `eq .LICENSE "mit"`.
///
/// The expression is true exactly when `{{if EXPR}}true{{end}}` renders
/// `"true"`.
pub fn eval_bool_expression(ctx: &Context, expression: &str) -> Result<bool> {
    let wrapped = format!("{{{{if {}}}}}true{{{{end}}}}", expression);
    let output = eval_template(ctx, &wrapped).map_err(|e| JigError::ExpressionError {
        expression: expression.to_string(),
        source: Box::new(e),
    })?;
    Ok(output == "true")
}

fn escape_triple_braces(text: &str) -> String {
    text.replace(TRIPLE_OPEN, ESCAPED_OPEN)
        .replace(TRIPLE_CLOSE, ESCAPED_CLOSE)
}

fn render(ctx: &Context, text: &str) -> Result<String> {
    let template = Template::parse("base", text).map_err(|source| JigError::ParseError {
        text: text.to_string(),
        source,
    })?;
    template
        .execute(&ctx.data())
        .map_err(|source| JigError::EvalError {
            text: text.to_string(),
            source,
        })
}
