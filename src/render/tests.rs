//! Tree walking and file materialization tests.

use super::*;
use crate::test_support::{create_tree, read, relative_entries, sample_context};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

use super::RenderMode::{Copy, Insert, Template};

fn entries_for(files: &[&str]) -> Vec<(String, String, RenderMode)> {
    let tree: Vec<(&str, &str)> = files.iter().map(|f| (*f, "")).collect();
    let input = create_tree(&tree);
    let output = Path::new("/output");
    let ctx = sample_context(input.path(), output);

    let entries = collect_entries(&ctx, input.path(), output, Copy).unwrap();
    let mut relative = relative_entries(&entries, input.path(), output);
    relative.sort_by(|a, b| a.0.cmp(&b.0));
    relative
}

fn expected(items: &[(&str, &str, RenderMode)]) -> Vec<(String, String, RenderMode)> {
    let mut items: Vec<_> = items
        .iter()
        .map(|(i, o, m)| (i.to_string(), o.to_string(), *m))
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items
}

// ============================================================================
// collect_entries
// ============================================================================

#[test]
fn test_plain_names_are_copied() {
    assert_eq!(
        entries_for(&["dir1/file2.txt", "dir2/file3.txt", "file1.txt"]),
        expected(&[
            ("dir1/file2.txt", "dir1/file2.txt", Copy),
            ("dir2/file3.txt", "dir2/file3.txt", Copy),
            ("file1.txt", "file1.txt", Copy),
        ])
    );
}

#[test]
fn test_tmpl_suffix_on_files() {
    assert_eq!(
        entries_for(&["dir1/file2.txt.tmpl", "dir2/file3.txt", "file1.txt.tmpl"]),
        expected(&[
            ("dir1/file2.txt.tmpl", "dir1/file2.txt", Template),
            ("dir2/file3.txt", "dir2/file3.txt", Copy),
            ("file1.txt.tmpl", "file1.txt", Template),
        ])
    );
}

#[test]
fn test_tmpl_dir_propagates_to_descendants() {
    assert_eq!(
        entries_for(&[
            "dir1.tmpl/file1.txt",
            "dir1.tmpl/file3.txt.tmpl",
            "dir1.tmpl/dir/file1.txt",
            "dir2/file1.txt",
            "dir2/dir/file2.txt.tmpl",
        ]),
        expected(&[
            ("dir1.tmpl/file1.txt", "dir1/file1.txt", Template),
            ("dir1.tmpl/file3.txt.tmpl", "dir1/file3.txt", Template),
            ("dir1.tmpl/dir/file1.txt", "dir1/dir/file1.txt", Template),
            ("dir2/file1.txt", "dir2/file1.txt", Copy),
            ("dir2/dir/file2.txt.tmpl", "dir2/dir/file2.txt", Template),
        ])
    );
}

#[test]
fn test_notmpl_reverts_to_copy_and_innermost_wins() {
    assert_eq!(
        entries_for(&[
            "dir.tmpl/file.txt",
            "dir.tmpl/dir1/file.txt",
            "dir.tmpl/dir2.notmpl/file1.txt",
            "dir.tmpl/dir2.notmpl/file2.txt.tmpl",
            "dir.tmpl/dir2.notmpl/dir/file1.txt",
            "dir.tmpl/dir2.notmpl/dir/file2.txt.tmpl",
        ]),
        expected(&[
            ("dir.tmpl/file.txt", "dir/file.txt", Template),
            ("dir.tmpl/dir1/file.txt", "dir/dir1/file.txt", Template),
            ("dir.tmpl/dir2.notmpl/file1.txt", "dir/dir2/file1.txt", Copy),
            ("dir.tmpl/dir2.notmpl/file2.txt.tmpl", "dir/dir2/file2.txt", Template),
            ("dir.tmpl/dir2.notmpl/dir/file1.txt", "dir/dir2/dir/file1.txt", Copy),
            ("dir.tmpl/dir2.notmpl/dir/file2.txt.tmpl", "dir/dir2/dir/file2.txt", Template),
        ])
    );
}

#[test]
fn test_insert_applies_to_itself_only() {
    assert_eq!(
        entries_for(&[
            "go.insert.mod",
            "extra.insert/file.txt",
            "tpl.tmpl/part.insert.txt",
        ]),
        expected(&[
            ("go.insert.mod", "go.mod", Insert),
            ("extra.insert/file.txt", "extra/file.txt", Copy),
            ("tpl.tmpl/part.insert.txt", "tpl/part.txt", Insert),
        ])
    );
}

#[test]
fn test_conditional_files() {
    assert_eq!(
        entries_for(&[
            "dir1/file1[[.TRUE_VAR]].txt.tmpl",
            "dir1/file2[[.FALSE_VAR]].txt.tmpl",
            "dir1/file3[[.UNDEFINED_VAR]].txt.tmpl",
        ]),
        expected(&[("dir1/file1[[.TRUE_VAR]].txt.tmpl", "dir1/file1.txt", Template)])
    );
}

#[test]
fn test_false_condition_excludes_whole_subtree() {
    assert_eq!(
        entries_for(&[
            "dir1[[.TRUE_VAR]]/file1.txt",
            "dir2[[.FALSE_VAR]]/file2.txt",
            "dir2[[.FALSE_VAR]]/sub.tmpl/file.txt.tmpl",
            "dir3[[.UNDEFINED_VAR]]/file3.txt",
        ]),
        expected(&[("dir1[[.TRUE_VAR]]/file1.txt", "dir1/file1.txt", Copy)])
    );
}

#[test]
fn test_variables_and_conditions_in_names() {
    assert_eq!(
        entries_for(&["dir1{{.VAR1}}[[.TRUE_VAR]]/file1{{.VAR2}}[[.TRUE_VAR]].txt.tmpl"]),
        expected(&[(
            "dir1{{.VAR1}}[[.TRUE_VAR]]/file1{{.VAR2}}[[.TRUE_VAR]].txt.tmpl",
            "dir1value1/file1value2.txt",
            Template,
        )])
    );
}

#[test]
fn test_empty_dir_names_collapse() {
    assert_eq!(
        entries_for(&[
            "dir1/[[.TRUE_VAR]]/dir2/file1.txt",
            "dir3/[[.UNDEFINED_VAR]]/dir4/file2.txt",
        ]),
        expected(&[("dir1/[[.TRUE_VAR]]/dir2/file1.txt", "dir1/dir2/file1.txt", Copy)])
    );
}

#[test]
fn test_file_resolving_to_empty_name_is_skipped() {
    assert_eq!(
        entries_for(&["dir/{{.EMPTY_VAR}}", "dir/kept.txt"]),
        expected(&[("dir/kept.txt", "dir/kept.txt", Copy)])
    );
}

#[test]
fn test_placeholders_in_names() {
    let input = create_tree(&[("ABC_PROJEKT_DEF.txt", ""), ("abcprojektdef.txt", "")]);
    let output = Path::new("/output");
    let ctx = sample_context(input.path(), output).with_placeholders(BTreeMap::from([
        ("projekt".to_string(), "myproject".to_string()),
        ("PROJEKT".to_string(), "MYPROJECT".to_string()),
    ]));

    let entries = collect_entries(&ctx, input.path(), output, Copy).unwrap();
    assert_eq!(
        relative_entries(&entries, input.path(), output),
        expected(&[
            ("ABC_PROJEKT_DEF.txt", "ABC_MYPROJECT_DEF.txt", Copy),
            ("abcprojektdef.txt", "abcmyprojectdef.txt", Copy),
        ])
    );
}

#[test]
fn test_entries_follow_lexical_order() {
    let input = create_tree(&[("b.txt", ""), ("a/z.txt", ""), ("A.txt", ""), ("a/b.txt", "")]);
    let output = Path::new("/output");
    let ctx = sample_context(input.path(), output);

    let entries = collect_entries(&ctx, input.path(), output, Copy).unwrap();
    let outputs: Vec<String> = relative_entries(&entries, input.path(), output)
        .into_iter()
        .map(|(_, o, _)| o)
        .collect();
    assert_eq!(outputs, vec!["A.txt", "a/b.txt", "a/z.txt", "b.txt"]);
}

#[test]
fn test_invalid_name_expression() {
    let input = create_tree(&[("file1{{..}}.txt.tmpl", "")]);
    let ctx = sample_context(input.path(), Path::new("/output"));

    let err = collect_entries(&ctx, input.path(), Path::new("/output"), Copy).unwrap_err();
    assert!(matches!(err, crate::error::JigError::NameError { ref name, .. } if name == "file1{{..}}.txt.tmpl"));
}

#[test]
fn test_name_resolving_outside_output_is_rejected() {
    let input = create_tree(&[("{{.DIR}}/f.txt", "x")]);
    let output = Path::new("/output");

    for dir in ["/etc", "..", "a/../../b"] {
        let mut ctx = sample_context(input.path(), output);
        ctx.set("DIR", serde_json::json!(dir));

        let err = collect_entries(&ctx, input.path(), output, Copy).unwrap_err();
        assert!(
            matches!(err, crate::error::JigError::NameError { ref name, .. } if name == "{{.DIR}}"),
            "{dir}: {err}"
        );
        assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
    }
}

#[test]
fn test_name_with_slash_nests_under_output() {
    let input = create_tree(&[("{{.DIR}}.txt", "")]);
    let output = Path::new("/output");
    let mut ctx = sample_context(input.path(), output);
    ctx.set("DIR", serde_json::json!("a/b"));

    let entries = collect_entries(&ctx, input.path(), output, Copy).unwrap();
    assert_eq!(entries[0].output, output.join("a/b.txt"));
    assert!(entries.iter().all(|e| e.output.starts_with(output)));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_name_is_an_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let input = TempDir::new().unwrap();
    let raw = OsStr::from_bytes(b"bad\xffname.txt");
    // Some filesystems refuse non-UTF-8 names outright.
    if fs::write(input.path().join(raw), "x").is_err() {
        return;
    }
    let output = Path::new("/output");
    let ctx = sample_context(input.path(), output);

    let err = collect_entries(&ctx, input.path(), output, Copy).unwrap_err();
    assert!(matches!(err, crate::error::JigError::IoError { .. }));
    assert!(err.to_string().contains("not valid UTF-8"));
}

#[test]
fn test_missing_input_dir() {
    let temp = TempDir::new().unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    let err = collect_entries(&ctx, &temp.path().join("nope"), temp.path(), Copy).unwrap_err();
    assert!(matches!(err, crate::error::JigError::IoError { .. }));
}

// ============================================================================
// materialize
// ============================================================================

fn render_one(content: &str, mode: RenderMode) -> String {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.txt");
    let output = temp.path().join("out/nested/out.txt");
    fs::write(&input, content).unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    materialize(
        &ctx,
        &Entry {
            input,
            output: output.clone(),
            mode,
        },
    )
    .unwrap();
    read(output)
}

#[test]
fn test_render_plain_text() {
    assert_eq!(render_one("abc\ndef", Template), "abc\ndef");
}

#[test]
fn test_render_with_whitespace_trimming() {
    assert_eq!(render_one("abc\n{{- .VAR1 -}}\ndef", Template), "abcvalue1def");
}

#[test]
fn test_render_if_true_and_false() {
    assert_eq!(
        render_one("abc\n{{if .TRUE_VAR}}def\n{{end}}ghi", Template),
        "abc\ndef\nghi"
    );
    assert_eq!(
        render_one("abc\n{{if .UNDEFINED_VAR}}def\n{{end}}ghi", Insert),
        "abc\nghi"
    );
}

#[test]
fn test_render_with_function() {
    assert_eq!(render_one("{{ .VAR1 | upper }}", Template), "VALUE1");
}

#[test]
fn test_copy_is_verbatim() {
    assert_eq!(render_one("{{ .VAR1 }} stays", Copy), "{{ .VAR1 }} stays");
}

#[test]
fn test_copy_binary_bytes() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("blob.bin");
    let output = temp.path().join("copy.bin");
    let bytes: Vec<u8> = vec![0, 159, 146, 150, 255, b'{', b'{'];
    fs::write(&input, &bytes).unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    materialize(
        &ctx,
        &Entry {
            input,
            output: output.clone(),
            mode: Copy,
        },
    )
    .unwrap();
    assert_eq!(fs::read(output).unwrap(), bytes);
}

#[test]
fn test_render_error_names_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("bad.txt");
    fs::write(&input, "{{if .VAR1}}").unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    let err = materialize(
        &ctx,
        &Entry {
            input: input.clone(),
            output: temp.path().join("out.txt"),
            mode: Template,
        },
    )
    .unwrap_err();
    assert!(matches!(err, crate::error::JigError::RenderError { ref path, .. } if *path == input));
}

#[test]
fn test_non_utf8_template_is_render_error() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("latin1.txt");
    fs::write(&input, b"caf\xe9 {{.VAR1}}").unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    let err = materialize(
        &ctx,
        &Entry {
            input: input.clone(),
            output: temp.path().join("out.txt"),
            mode: Template,
        },
    )
    .unwrap_err();
    assert!(matches!(err, crate::error::JigError::RenderError { ref path, .. } if *path == input));
    assert!(err.to_string().contains("not valid UTF-8 (first bad byte at offset 3)"));
    assert!(!temp.path().join("out.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_rendered_file_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("run.sh");
    let output = temp.path().join("out/run.sh");
    fs::write(&input, "#!/bin/sh\necho {{.VAR1}}\n").unwrap();
    fs::set_permissions(&input, fs::Permissions::from_mode(0o755)).unwrap();
    let ctx = sample_context(temp.path(), temp.path());

    materialize(
        &ctx,
        &Entry {
            input,
            output: output.clone(),
            mode: Template,
        },
    )
    .unwrap();

    assert_eq!(read(&output), "#!/bin/sh\necho value1\n");
    let mode = fs::metadata(&output).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}

// ============================================================================
// render_dir
// ============================================================================

#[test]
fn test_render_dir_end_to_end() {
    let input = create_tree(&[
        ("README.md", "# {{.VAR1}}"),
        ("src.tmpl/main.go", "package {{.VAR1}}"),
        ("src.tmpl/vendor.notmpl/lib.go", "// {{.VAR1}}"),
        ("docs[[.FALSE_VAR]]/guide.md", "never"),
    ]);
    let output = TempDir::new().unwrap();
    let ctx = sample_context(input.path(), output.path());

    let entries = render_dir(&ctx, input.path(), output.path()).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(read(output.path().join("README.md")), "# {{.VAR1}}");
    assert_eq!(read(output.path().join("src/main.go")), "package value1");
    assert_eq!(read(output.path().join("src/vendor/lib.go")), "// {{.VAR1}}");
    assert!(!output.path().join("docs").exists());
}

#[test]
fn test_render_dir_overwrites_existing_files() {
    let input = create_tree(&[("a.txt.tmpl", "{{.VAR2}}")]);
    let output = TempDir::new().unwrap();
    fs::write(output.path().join("a.txt"), "stale content that is longer").unwrap();
    let ctx = sample_context(input.path(), output.path());

    render_dir(&ctx, input.path(), output.path()).unwrap();

    assert_eq!(read(output.path().join("a.txt")), "value2");
}
