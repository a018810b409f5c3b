//! File actions behind the row context menu

use crate::error::{FindViewError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder to open for a result: the entry itself if it is a directory,
/// otherwise its parent
pub fn containing_folder(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn open_folder(path: &Path) -> Result<()> {
    open::that(containing_folder(path))?;
    Ok(())
}

pub fn copy_paths(paths: &[PathBuf]) -> Result<()> {
    let text = paths
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join("\n");
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| FindViewError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| FindViewError::Clipboard(e.to_string()))
}

/// Move paths to the trash one at a time. Stops at the first failure and
/// returns the paths already trashed alongside it.
pub fn move_to_trash(paths: &[PathBuf]) -> (Vec<PathBuf>, Result<()>) {
    remove_each(paths, |path| {
        trash::delete(path).map_err(|e| FindViewError::Trash(format!("{}: {}", path.display(), e)))
    })
}

/// Permanently remove files and directory trees. Stops at the first failure
/// and returns the paths removed so far alongside it.
pub fn delete(paths: &[PathBuf]) -> (Vec<PathBuf>, Result<()>) {
    remove_each(paths, |path| {
        // Do not follow symlinks to directories
        match fs::symlink_metadata(path)? {
            meta if meta.is_dir() => fs::remove_dir_all(path)?,
            _ => fs::remove_file(path)?,
        }
        Ok(())
    })
}

fn remove_each<F>(paths: &[PathBuf], mut remove: F) -> (Vec<PathBuf>, Result<()>)
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut removed = Vec::with_capacity(paths.len());
    for path in paths {
        if let Err(e) = remove(path) {
            return (removed, Err(e));
        }
        removed.push(path.clone());
    }
    (removed, Ok(()))
}
