//! Drag-lifecycle events forwarded by the host.

use crate::models::file::FileEntry;

/// Target name that matches every drop zone.
pub const DOCUMENT_TARGET: &str = "document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEventKind {
    Enter,
    Leave,
    Over,
    Drop,
}

/// Raw event as delivered by the host window or webview bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEvent {
    pub kind: DragEventKind,
    /// Identifier of the element the pointer is over.
    pub target: String,
    /// Dropped files. Empty for anything but `Drop`.
    pub files: Vec<FileEntry>,
}

impl DragEvent {
    pub fn new(kind: DragEventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            files: Vec::new(),
        }
    }

    pub fn drop_files(target: impl Into<String>, files: Vec<FileEntry>) -> Self {
        Self {
            files,
            ..Self::new(DragEventKind::Drop, target)
        }
    }
}
