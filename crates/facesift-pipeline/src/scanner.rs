//! Candidate enumeration over the source folder.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Enumerate candidate image files under `dir`.
///
/// Filters by extension (case-insensitive, without the dot); descends into
/// subdirectories only when `recursive` is set. Entries come back sorted by
/// file name so runs are deterministic. Unreadable directory entries are
/// logged and skipped, never fatal.
pub fn scan(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut candidates = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_recognized_extension(entry.path(), extensions) {
            candidates.push(entry.into_path());
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        found = candidates.len(),
        skipped,
        recursive,
        "scan complete"
    );

    Ok(candidates)
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            extensions.iter().any(|ext| *ext == e)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        vec!["png".into(), "jpg".into(), "jpeg".into()]
    }

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            scan(&missing, &exts(), false),
            Err(ScanError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_scan_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.PNG")); // case-insensitive
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("noext"));

        let found = scan(dir.path(), &exts(), false).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_scan_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("c.jpg"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let found = scan(dir.path(), &exts(), false).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_scan_non_recursive_ignores_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.jpg"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/nested.jpg"));

        let found = scan(dir.path(), &exts(), false).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("top.jpg"));
    }

    #[test]
    fn test_scan_recursive_descends() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.jpg"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/nested.jpg"));

        let found = scan(dir.path(), &exts(), true).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path(), &exts(), false).unwrap().is_empty());
    }
}
