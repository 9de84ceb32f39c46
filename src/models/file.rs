//! File entry model for dropped files.

/// A file delivered by a drop event.
///
/// `file_path` is the handle the upload reads from; `mime_type` is guessed
/// from the extension when the entry is resolved from disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
}

impl FileEntry {
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_size: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }
}
