//! Dropped path resolution.
//!
//! Hosts that deliver drops as filesystem paths (desktop shells, webview
//! bridges) resolve them here into file entries. Directories are traversed
//! recursively; hidden and known system files are filtered out.

use std::path::Path;

use crate::error::AppError;
use crate::models::event::DragEvent;
use crate::models::file::FileEntry;

/// System file names that should be filtered out regardless of location.
const SYSTEM_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Directory names that should be skipped during recursive traversal.
const SYSTEM_DIRS: &[&str] = &["__MACOSX"];

const FALLBACK_MIME: &str = "application/octet-stream";

fn is_hidden_or_system(name: &str) -> bool {
    name.starts_with('.') || SYSTEM_FILES.contains(&name) || SYSTEM_DIRS.contains(&name)
}

/// Adds a single file entry without filtering (used for top-level paths).
fn add_file_entry(path: &Path, entries: &mut Vec<FileEntry>) -> Result<(), AppError> {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return Ok(()),
    };
    let metadata = std::fs::metadata(path)?;
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME);
    entries.push(FileEntry {
        file_name: name.to_string(),
        file_path: path.to_string_lossy().to_string(),
        file_size: metadata.len(),
        mime_type: mime_type.to_string(),
    });
    Ok(())
}

fn collect_dir_contents(dir: &Path, entries: &mut Vec<FileEntry>) -> Result<(), AppError> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    // read_dir order is platform dependent; ids are assigned in drop order.
    children.sort();

    for child in children {
        let name = match child.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if is_hidden_or_system(name) {
            continue;
        }
        if child.is_file() {
            add_file_entry(&child, entries)?;
        } else if child.is_dir() {
            collect_dir_contents(&child, entries)?;
        }
    }
    Ok(())
}

/// Resolves dropped file/directory paths into a flat list of file entries.
///
/// Returns an error if any path does not exist.
pub async fn resolve_dropped_paths(paths: Vec<String>) -> crate::error::Result<Vec<FileEntry>> {
    tokio::task::spawn_blocking(move || resolve_paths_inner(&paths))
        .await
        .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

/// Build a drop event for `target` from dropped filesystem paths.
pub async fn drop_event_from_paths(
    target: impl Into<String>,
    paths: Vec<String>,
) -> crate::error::Result<DragEvent> {
    let files = resolve_dropped_paths(paths).await?;
    Ok(DragEvent::drop_files(target, files))
}

fn resolve_paths_inner(paths: &[String]) -> crate::error::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for path_str in paths {
        let path = Path::new(path_str);
        if !path.exists() {
            return Err(AppError::Io(format!("Path does not exist: {}", path_str)));
        }
        if path.is_file() {
            add_file_entry(path, &mut entries)?;
        } else if path.is_dir() {
            collect_dir_contents(path, &mut entries)?;
        }
    }
    Ok(entries)
}
