//! Filesystem helpers shared by rendering and the project file.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file};

use crate::error::{JigError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Create the parent directory of `path` (and its ancestors) if missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| JigError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Join `relative` onto `root`, refusing any path that would leave `root`:
/// absolute paths, drive prefixes and `..` components.
pub fn join_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut joined = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                return Err(JigError::UserError(format!(
                    "path {:?} escapes '{}'",
                    relative,
                    root.display()
                )));
            }
        }
    }
    Ok(joined)
}

/// Apply the permission bits of `source` to `target`.
pub fn copy_permissions(source: &Path, target: &Path) -> Result<()> {
    let permissions = fs::metadata(source)
        .map_err(|e| JigError::io("read metadata of", source, e))?
        .permissions();
    fs::set_permissions(target, permissions)
        .map_err(|e| JigError::io("set permissions on", target, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_parent_dir_creates_ancestors() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/c.txt");

        ensure_parent_dir(&target).unwrap();

        assert!(temp.path().join("a/b").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn test_ensure_parent_dir_bare_file_name() {
        ensure_parent_dir(Path::new("file.txt")).unwrap();
    }

    #[test]
    fn test_join_within_keeps_nested_paths() {
        let root = Path::new("/project");
        assert_eq!(join_within(root, "a/b.txt").unwrap(), root.join("a/b.txt"));
        assert_eq!(join_within(root, "./a").unwrap(), root.join("a"));
        assert_eq!(join_within(root, "").unwrap(), root);
    }

    #[test]
    fn test_join_within_rejects_escapes() {
        let root = Path::new("/project");
        for relative in ["/etc", "/etc/passwd", "../sibling", "a/../../b"] {
            let err = join_within(root, relative).unwrap_err();
            assert!(matches!(err, JigError::UserError(_)), "{relative}");
            assert!(err.to_string().contains("escapes"), "{relative}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("run.sh");
        let target = temp.path().join("out.sh");
        fs::write(&source, "#!/bin/sh\n").unwrap();
        fs::write(&target, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

        copy_permissions(&source, &target).unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
