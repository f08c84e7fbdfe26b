//! Input discovery for the CLI.
//!
//! Turns the paths given on the command line into a lazy sequence of file
//! items. Directories are walked recursively in file-name order; each
//! subdirectory yields a null marker item and each `.svg` file a buffered
//! item whose base is the directory that was walked.

use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IconError, Result};
use crate::types::{Contents, FileItem, ICON_EXTENSION};

/// Check if a path names an icon file.
pub fn is_icon(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > ICON_EXTENSION.len() && n.ends_with(ICON_EXTENSION))
}

/// Lazily scan files and directories for icons, in argument order.
pub fn scan_inputs(inputs: &[PathBuf]) -> impl Iterator<Item = Result<FileItem>> + '_ {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    inputs
        .iter()
        .flat_map(move |input| scan_input(input, cwd.clone()))
}

fn scan_input(input: &Path, cwd: PathBuf) -> Box<dyn Iterator<Item = Result<FileItem>>> {
    if input.is_dir() {
        let base = input.to_path_buf();
        let walker = WalkDir::new(input)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter();

        Box::new(walker.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(IconError::Upstream {
                        message: format!("Failed to scan {}: {}", base.display(), e),
                    }))
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() {
                return Some(Ok(FileItem::new(path, &base, &cwd, Contents::Null)));
            }
            is_icon(path).then(|| read_icon(path, &base, &cwd))
        }))
    } else if input.is_file() {
        let base = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Box::new(iter::once(read_icon(input, &base, &cwd)))
    } else {
        Box::new(iter::once(Err(IconError::Io {
            path: input.to_path_buf(),
            message: "Input not found".to_string(),
        })))
    }
}

fn read_icon(path: &Path, base: &Path, cwd: &Path) -> Result<FileItem> {
    let bytes = fs::read(path).map_err(|e| IconError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read icon: {}", e),
    })?;
    Ok(FileItem::new(path, base, cwd, Contents::Buffer(bytes)))
}
