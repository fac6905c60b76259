//! Resolution of a single path segment.

use regex::Regex;
use std::sync::LazyLock;

use super::RenderMode;
use crate::context::Context;
use crate::error::{JigError, Result};
use crate::eval::{eval_bool_expression, eval_template};

static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.*?)]]").expect("valid condition regex"));

/// Mode markers in priority order; the first one present wins.
static MODE_MARKERS: LazyLock<[(Regex, RenderMode); 3]> = LazyLock::new(|| {
    [
        (
            Regex::new(r"\.tmpl($|\.)").expect("valid marker regex"),
            RenderMode::Template,
        ),
        (
            Regex::new(r"\.notmpl($|\.)").expect("valid marker regex"),
            RenderMode::Copy,
        ),
        (
            Regex::new(r"\.insert($|\.)").expect("valid marker regex"),
            RenderMode::Insert,
        ),
    ]
});

/// Outcome of resolving one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedName {
    /// A `[[condition]]` was false; the segment and its subtree are dropped.
    Excluded,
    Included { name: String, mode: RenderMode },
}

/// Resolve a raw file or directory name.
///
/// `[[expr]]` regions are evaluated left to right and removed; any false one
/// excludes the segment. The rest is rendered as a template, then the first
/// matching mode marker is stripped.
pub fn resolve_segment_name(ctx: &Context, raw: &str) -> Result<ResolvedName> {
    let wrap = |source: JigError| JigError::NameError {
        name: raw.to_string(),
        source: Box::new(source),
    };

    let mut name = raw.to_string();
    while let Some(caps) = CONDITION_RE.captures(&name) {
        let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if !eval_bool_expression(ctx, expr.as_str()).map_err(wrap)? {
            return Ok(ResolvedName::Excluded);
        }
        let range = whole.range();
        name.replace_range(range, "");
    }

    let rendered = eval_template(ctx, &name).map_err(wrap)?;
    let (name, mode) = strip_mode_marker(&rendered);
    Ok(ResolvedName::Included { name, mode })
}

fn strip_mode_marker(name: &str) -> (String, RenderMode) {
    for (re, mode) in MODE_MARKERS.iter() {
        if re.is_match(name) {
            return (re.replace_all(name, "${1}").into_owned(), *mode);
        }
    }
    (name.to_string(), RenderMode::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Context {
        let mut ctx = Context::new("/tpl", "/out");
        ctx.set("VAR1", json!("value1"));
        ctx.set("TRUE_VAR", json!(true));
        ctx.set("FALSE_VAR", json!(false));
        ctx
    }

    fn included(name: &str, mode: RenderMode) -> ResolvedName {
        ResolvedName::Included {
            name: name.to_string(),
            mode,
        }
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(
            resolve_segment_name(&context(), "main.go").unwrap(),
            included("main.go", RenderMode::Default)
        );
    }

    #[test]
    fn test_markers() {
        let ctx = context();
        assert_eq!(
            resolve_segment_name(&ctx, "file.txt.tmpl").unwrap(),
            included("file.txt", RenderMode::Template)
        );
        assert_eq!(
            resolve_segment_name(&ctx, "dir.notmpl").unwrap(),
            included("dir", RenderMode::Copy)
        );
        assert_eq!(
            resolve_segment_name(&ctx, "go.insert.mod").unwrap(),
            included("go.mod", RenderMode::Insert)
        );
    }

    #[test]
    fn test_marker_must_be_whole_extension() {
        assert_eq!(
            resolve_segment_name(&context(), "file.tmplx").unwrap(),
            included("file.tmplx", RenderMode::Default)
        );
    }

    #[test]
    fn test_tmpl_wins_over_notmpl() {
        assert_eq!(
            resolve_segment_name(&context(), "a.notmpl.tmpl").unwrap(),
            included("a.notmpl", RenderMode::Template)
        );
    }

    #[test]
    fn test_true_conditions_are_stripped() {
        assert_eq!(
            resolve_segment_name(&context(), "file[[.TRUE_VAR]]{{.VAR1}}[[not .FALSE_VAR]].txt")
                .unwrap(),
            included("filevalue1.txt", RenderMode::Default)
        );
    }

    #[test]
    fn test_false_condition_excludes() {
        let ctx = context();
        assert_eq!(
            resolve_segment_name(&ctx, "dir[[.FALSE_VAR]]").unwrap(),
            ResolvedName::Excluded
        );
        assert_eq!(
            resolve_segment_name(&ctx, "dir[[.TRUE_VAR]][[.UNDEFINED]]").unwrap(),
            ResolvedName::Excluded
        );
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(
            resolve_segment_name(&context(), "[[.TRUE_VAR]]").unwrap(),
            included("", RenderMode::Default)
        );
    }

    #[test]
    fn test_invalid_expression_names_segment() {
        let err = resolve_segment_name(&context(), "file1{{..}}.txt.tmpl").unwrap_err();
        assert_eq!(
            err.to_string(),
            "resolve name \"file1{{..}}.txt.tmpl\": parse template \"file1{{..}}.txt.tmpl\": \
             template: base:1: unexpected <.> in operand"
        );
    }
}
