//! Upload endpoint abstraction layer.
//!
//! `UploadApi` is the only interface through which the crate talks to the
//! receiving endpoint. Services call through this trait and never build HTTP
//! requests themselves, which keeps the runner testable against a scripted
//! implementation and lets hosts swap the transport.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;

/// Receives `(bytes_sent, bytes_total)` as the request body is streamed.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

pub struct FileUploadParams {
    pub file_id: u64,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub endpoint_url: String,
    pub timeout: Option<Duration>,
    pub on_progress: Option<ProgressFn>,
}

impl std::fmt::Debug for FileUploadParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUploadParams")
            .field("file_id", &self.file_id)
            .field("file_name", &self.file_name)
            .field("file_path", &self.file_path)
            .field("mime_type", &self.mime_type)
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Abstraction over the upload endpoint.
pub trait UploadApi: Send + Sync {
    /// POST one file as a single multipart field named after its id.
    ///
    /// Resolves to the parsed JSON body on HTTP 200. A non-200 answer is
    /// `AppError::Api`, a missed deadline `AppError::Timeout`, and any other
    /// transport failure `AppError::Network`.
    fn upload_file(
        &self,
        params: FileUploadParams,
    ) -> impl std::future::Future<Output = std::result::Result<serde_json::Value, AppError>> + Send;
}

pub mod http;
