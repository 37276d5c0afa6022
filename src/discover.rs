//! Filesystem discovery of eval archives.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Collects the archives to parse, in sorted order.
///
/// A single `.eval` file may be given directly. Directories are walked
/// recursively; unreadable entries are skipped with a warning instead of
/// failing the batch. The extension check ignores case.
pub fn discover_archives(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_eval_file(root) { vec![root.to_path_buf()] } else { Vec::new() };
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        match entry {
            Ok(e) if e.file_type().is_file() && is_eval_file(e.path()) => {
                found.push(e.into_path());
            }
            Ok(_) => {}
            Err(err) => warn!("skipping unreadable entry: {err}"),
        }
    }
    found.sort();
    found
}

fn is_eval_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("eval"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"").expect("touch");
    }

    #[test]
    fn test_recursive_discovery_is_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
        touch(&dir.path().join("zeta.eval"));
        touch(&dir.path().join("alpha.eval"));
        touch(&dir.path().join("nested").join("mid.eval"));
        touch(&dir.path().join("notes.txt"));

        let found = discover_archives(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).expect("prefix").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["alpha.eval", "nested/mid.eval", "zeta.eval"]);
    }

    #[test]
    fn test_extension_check_ignores_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(&dir.path().join("upper.EVAL"));
        assert_eq!(discover_archives(dir.path()).len(), 1);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let direct = dir.path().join("one.eval");
        touch(&direct);
        assert_eq!(discover_archives(&direct), [direct.clone()]);

        let other = dir.path().join("one.txt");
        touch(&other);
        assert!(discover_archives(&other).is_empty());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        assert!(discover_archives(Path::new("/nonexistent/evals")).is_empty());
    }
}
