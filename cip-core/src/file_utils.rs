//! File utility functions.

use crate::error::{CipError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively find files with given extension in a directory, sorted by path.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(CipError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory not found: {}", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == extension) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
