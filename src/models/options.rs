//! Uploader options and callback slots.
//!
//! Options are built once at init by overlaying caller overrides onto the
//! defaults field by field. For the original option fields a "falsy"
//! override (`0`, `""`) is replaced by the default instead of being honored,
//! so `maxSizeMib: 0` still yields the 128 MiB default.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;
use crate::models::event::{DragEvent, DOCUMENT_TARGET};
use crate::models::upload::{FailureCode, Rejection};

pub const DEFAULT_MAX_SIZE_MIB: u64 = 128;
pub const DEFAULT_MAX_BATCH_COUNT: usize = 9;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 50;

/// Class of files a drop zone accepts, matched as a MIME type substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    #[default]
    All,
    Image,
    Video,
    Audio,
}

impl FileClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileClass::All => "all",
            FileClass::Image => "image",
            FileClass::Video => "video",
            FileClass::Audio => "audio",
        }
    }

    pub fn admits(&self, mime_type: &str) -> bool {
        match self {
            FileClass::All => true,
            class => mime_type.contains(class.as_str()),
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    /// Drop zone the uploader listens on; `"document"` matches any target.
    pub target: String,
    pub endpoint_url: String,
    pub file_class: FileClass,
    pub max_size_mib: u64,
    pub max_batch_count: usize,
    /// Per-request deadline. Absent means no timeout.
    pub timeout_ms: Option<u64>,
    /// Keep draining the queue after a transport error or timeout.
    pub continue_after_failure: bool,
    /// Attempts allowed after the first one. Absent means unbounded.
    pub max_retries: Option<u32>,
    /// Start the upload runner as soon as a drop is enqueued.
    pub auto_start: bool,
    /// Minimum gap between progress callbacks; `0` disables throttling.
    pub progress_interval_ms: u64,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            target: DOCUMENT_TARGET.to_string(),
            endpoint_url: String::new(),
            file_class: FileClass::All,
            max_size_mib: DEFAULT_MAX_SIZE_MIB,
            max_batch_count: DEFAULT_MAX_BATCH_COUNT,
            timeout_ms: None,
            continue_after_failure: true,
            max_retries: None,
            auto_start: false,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

/// Caller-supplied overrides; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_class: Option<FileClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mib: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batch_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_after_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_interval_ms: Option<u64>,
}

trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for usize {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

fn overlay<T: Truthy>(custom: Option<T>, default: T) -> T {
    custom.filter(Truthy::is_truthy).unwrap_or(default)
}

impl UploadOptions {
    /// Merge `custom` over `defaults`. `None` returns the defaults unchanged.
    pub fn build(custom: Option<OptionsOverride>, defaults: UploadOptions) -> UploadOptions {
        let Some(custom) = custom else {
            return defaults;
        };
        UploadOptions {
            target: overlay(custom.target, defaults.target),
            endpoint_url: overlay(custom.endpoint_url, defaults.endpoint_url),
            file_class: custom.file_class.unwrap_or(defaults.file_class),
            max_size_mib: overlay(custom.max_size_mib, defaults.max_size_mib),
            max_batch_count: overlay(custom.max_batch_count, defaults.max_batch_count),
            // Zero means no deadline.
            timeout_ms: custom
                .timeout_ms
                .filter(Truthy::is_truthy)
                .or(defaults.timeout_ms),
            continue_after_failure: custom
                .continue_after_failure
                .unwrap_or(defaults.continue_after_failure),
            max_retries: custom.max_retries.or(defaults.max_retries),
            auto_start: custom.auto_start.unwrap_or(defaults.auto_start),
            // Zero forwards every tick.
            progress_interval_ms: custom
                .progress_interval_ms
                .unwrap_or(defaults.progress_interval_ms),
        }
    }

    /// The endpoint as an absolute `http`/`https` URL.
    pub fn endpoint(&self) -> crate::error::Result<Url> {
        parse_endpoint(&self.endpoint_url)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mib.saturating_mul(1024 * 1024)
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_ms.map(std::time::Duration::from_millis)
    }
}

pub fn parse_endpoint(raw: &str) -> crate::error::Result<Url> {
    if raw.is_empty() {
        return Err(AppError::Internal("No upload endpoint configured".into()));
    }
    let url = Url::parse(raw)
        .map_err(|e| AppError::Internal(format!("Invalid upload endpoint '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::Internal(format!(
            "Unsupported upload endpoint scheme '{}' in '{}'",
            scheme, raw
        ))),
    }
}

pub type DragCallback = Arc<dyn Fn(&DragEvent) + Send + Sync>;
pub type StartCallback = Arc<dyn Fn(u64) + Send + Sync>;
pub type ProgressCallback = Arc<dyn Fn(u64, u64, u64) + Send + Sync>;
pub type SuccessCallback = Arc<dyn Fn(u64, &serde_json::Value) + Send + Sync>;
pub type FailedCallback = Arc<dyn Fn(u64, FailureCode, Option<&str>) + Send + Sync>;
pub type RejectedCallback = Arc<dyn Fn(&Rejection) + Send + Sync>;

/// Callback slots. An empty slot is simply never invoked.
#[derive(Clone, Default)]
pub struct UploadCallbacks {
    pub on_drag_enter: Option<DragCallback>,
    pub on_drag_leave: Option<DragCallback>,
    pub on_drag_over: Option<DragCallback>,
    pub on_drop: Option<DragCallback>,
    pub on_upload_start: Option<StartCallback>,
    pub on_upload_progress: Option<ProgressCallback>,
    pub on_upload_success: Option<SuccessCallback>,
    pub on_upload_failed: Option<FailedCallback>,
    pub on_rejected: Option<RejectedCallback>,
}

impl UploadCallbacks {
    /// Callbacks that only log, used as the defaults under caller callbacks.
    pub fn logging() -> Self {
        Self {
            on_drag_enter: Some(Arc::new(|e: &DragEvent| {
                log::debug!("drag enter: target={}", e.target)
            })),
            on_drag_leave: Some(Arc::new(|e: &DragEvent| {
                log::debug!("drag leave: target={}", e.target)
            })),
            on_drag_over: Some(Arc::new(|e: &DragEvent| {
                log::trace!("drag over: target={}", e.target)
            })),
            on_drop: Some(Arc::new(|e: &DragEvent| {
                log::debug!("drop: target={}, files={}", e.target, e.files.len())
            })),
            on_upload_start: Some(Arc::new(|file_id: u64| {
                log::info!("File {} starts uploading", file_id)
            })),
            on_upload_progress: Some(Arc::new(|file_id: u64, loaded: u64, total: u64| {
                log::debug!("File {} upload progress: {}/{}", file_id, loaded, total)
            })),
            on_upload_success: Some(Arc::new(|file_id: u64, _: &serde_json::Value| {
                log::info!("File {} upload success", file_id)
            })),
            on_upload_failed: Some(Arc::new(|file_id: u64, code: FailureCode, msg: Option<&str>| {
                log::warn!(
                    "File {} upload failed: code={:?}, message={}",
                    file_id,
                    code.code(),
                    msg.unwrap_or("")
                )
            })),
            on_rejected: Some(Arc::new(|rejection: &Rejection| {
                log::warn!("Dropped files rejected: {}", rejection)
            })),
        }
    }

    /// Merge `custom` over `defaults`: an occupied custom slot wins.
    pub fn build(custom: Option<UploadCallbacks>, defaults: UploadCallbacks) -> UploadCallbacks {
        let Some(custom) = custom else {
            return defaults;
        };
        UploadCallbacks {
            on_drag_enter: custom.on_drag_enter.or(defaults.on_drag_enter),
            on_drag_leave: custom.on_drag_leave.or(defaults.on_drag_leave),
            on_drag_over: custom.on_drag_over.or(defaults.on_drag_over),
            on_drop: custom.on_drop.or(defaults.on_drop),
            on_upload_start: custom.on_upload_start.or(defaults.on_upload_start),
            on_upload_progress: custom.on_upload_progress.or(defaults.on_upload_progress),
            on_upload_success: custom.on_upload_success.or(defaults.on_upload_success),
            on_upload_failed: custom.on_upload_failed.or(defaults.on_upload_failed),
            on_rejected: custom.on_rejected.or(defaults.on_rejected),
        }
    }

    pub fn on_drag_enter(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drag_enter = Some(Arc::new(f));
        self
    }

    pub fn on_drag_leave(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drag_leave = Some(Arc::new(f));
        self
    }

    pub fn on_drag_over(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drag_over = Some(Arc::new(f));
        self
    }

    pub fn on_drop(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drop = Some(Arc::new(f));
        self
    }

    pub fn on_upload_start(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_upload_start = Some(Arc::new(f));
        self
    }

    pub fn on_upload_progress(mut self, f: impl Fn(u64, u64, u64) + Send + Sync + 'static) -> Self {
        self.on_upload_progress = Some(Arc::new(f));
        self
    }

    pub fn on_upload_success(
        mut self,
        f: impl Fn(u64, &serde_json::Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_upload_success = Some(Arc::new(f));
        self
    }

    pub fn on_upload_failed(
        mut self,
        f: impl Fn(u64, FailureCode, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.on_upload_failed = Some(Arc::new(f));
        self
    }

    pub fn on_rejected(mut self, f: impl Fn(&Rejection) + Send + Sync + 'static) -> Self {
        self.on_rejected = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for UploadCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCallbacks")
            .field("on_drag_enter", &self.on_drag_enter.is_some())
            .field("on_drag_leave", &self.on_drag_leave.is_some())
            .field("on_drag_over", &self.on_drag_over.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .field("on_upload_start", &self.on_upload_start.is_some())
            .field("on_upload_progress", &self.on_upload_progress.is_some())
            .field("on_upload_success", &self.on_upload_success.is_some())
            .field("on_upload_failed", &self.on_upload_failed.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .finish()
    }
}
