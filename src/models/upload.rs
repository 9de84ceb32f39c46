//! Upload task, outcome and rejection types.

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::models::file::FileEntry;

/// One accepted file, tracked by a unique id until its upload resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    pub file_id: u64,
    pub file: FileEntry,
    /// `file://` URL for image files, usable as a thumbnail source.
    pub preview_url: Option<Url>,
    pub name: String,
    pub size: u64,
    /// Number of upload attempts started for this task.
    pub attempts: u32,
}

impl UploadTask {
    pub fn new(file_id: u64, file: FileEntry) -> Self {
        let preview_url = if file.is_image() {
            Url::from_file_path(&file.file_path).ok()
        } else {
            None
        };
        Self {
            file_id,
            name: file.file_name.clone(),
            size: file.file_size,
            preview_url,
            file,
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Pending,
    InFlight,
    Succeeded,
    FailedTerminal,
    FailedRetryable,
}

/// How a single upload attempt resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// HTTP 200 with a JSON body.
    Succeeded(serde_json::Value),
    /// Non-200 response, unparseable success body, or a local failure
    /// (unreadable file). Never retried.
    ApplicationError { status: Option<u16> },
    TransportError(String),
    TimedOut,
}

impl UploadOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            UploadOutcome::Succeeded(_) => TaskStatus::Succeeded,
            UploadOutcome::ApplicationError { .. } => TaskStatus::FailedTerminal,
            UploadOutcome::TransportError(_) | UploadOutcome::TimedOut => {
                TaskStatus::FailedRetryable
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.status() == TaskStatus::FailedRetryable
    }
}

/// Code passed to the failure callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// Endpoint answered with a non-200 status; no numeric code is forwarded.
    Application,
    Transport,
    Timeout,
}

impl FailureCode {
    pub fn code(&self) -> Option<i32> {
        match self {
            FailureCode::Application => None,
            FailureCode::Transport => Some(-1),
            FailureCode::Timeout => Some(-2),
        }
    }
}

/// Why a dropped batch (or an enqueue) was refused. The `Display` text is the
/// user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("at most {max} files can be uploaded at once")]
    TooManyFiles { max: usize },

    #[error("the upload queue already holds {max} files")]
    QueueFull { max: usize },

    #[error("only {class} files are supported")]
    DisallowedType { class: String, file_name: String },

    #[error("only files up to {max_mib} MiB are supported, {file_name} exceeds the limit")]
    TooLarge { file_name: String, max_mib: u64 },
}
