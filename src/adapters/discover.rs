//! Non-recursive file discovery. The engine's state is per-file; there is
//! no cross-file correlation, consistent with the Non-goals, so discovery
//! just needs to hand back an ordered list of files to process
//! independently.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// `path` is either a single file (returned as-is, regardless of
/// extension) or a directory, in which case every `*.csv` entry directly
/// inside it is returned in sorted order.
pub fn discover_csv_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("csv"))
            .collect();
        files.sort();
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_is_returned_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("jump.log");
        std::fs::write(&file, "").unwrap();
        let found = discover_csv_files(&file).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn directory_yields_only_csv_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "").unwrap();
        std::fs::write(dir.path().join("a.csv"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let found = discover_csv_files(dir.path()).unwrap();
        let names: Vec<&str> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
