//! File expansion, deduplication, and batch reporting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use zenbound::ImageFormat;

/// Expand input patterns into a deduplicated list of files, in input order.
///
/// Handles:
/// - Glob patterns (containing `*`, `?`, `[`)
/// - Plain file paths
/// - Directories (recursive image discovery)
///
/// With `keep_missing`, plain paths that do not exist are passed through so
/// the reader can report them; otherwise they are an error.
pub fn expand_inputs(patterns: &[String], keep_missing: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() && is_image(&path) {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                for_each_image_in_dir(&path, &mut seen, &mut files);
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else if keep_missing {
                files.push(path);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    Ok(files)
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

/// Check if a file path has a recognized image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

/// Recursively find image files in a directory, sorted by name per level.
fn for_each_image_in_dir(dir: &Path, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            for_each_image_in_dir(&path, seen, files);
        } else if path.is_file() && is_image(&path) {
            push_unique(path, seen, files);
        }
    }
}

/// Process exit code for a batch: the first non-zero status, else 0.
pub fn exit_code(statuses: impl IntoIterator<Item = i32>) -> i32 {
    statuses.into_iter().find(|&s| s != 0).unwrap_or(0)
}

/// Format a byte size into a human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_first_failure() {
        assert_eq!(exit_code([0, 0]), 0);
        assert_eq!(exit_code([0, 3, 1]), 3);
        assert_eq!(exit_code([1]), 1);
        assert_eq!(exit_code([]), 0);
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn expansion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let root = dir.path().to_string_lossy().to_string();
        let files = expand_inputs(&[root.clone()], false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.jpg", "b.png"]);

        let glob = format!("{root}/*.png");
        let twice = expand_inputs(&[glob.clone(), glob], false).unwrap();
        assert_eq!(twice.len(), 1);

        let missing = format!("{root}/nofile.png");
        assert!(expand_inputs(&[missing.clone()], false).is_err());
        assert_eq!(expand_inputs(&[missing], true).unwrap().len(), 1);
    }
}
