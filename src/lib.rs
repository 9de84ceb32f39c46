//! Drop-zone file uploader.
//!
//! Files dropped on a configured target are validated as a batch, queued,
//! and uploaded one at a time to a single endpoint, with progress and
//! outcome callbacks. Hosts call [`init`], forward drag events to
//! [`DropZone::dispatch`], and start the queue with [`DropZone::start`]
//! (or set `autoStart`).

pub mod api;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use commands::drop_zone::DropZone;
pub use commands::upload::{init, init_from_file, start_upload};
pub use error::{AppError, Result};
pub use models::event::{DragEvent, DragEventKind};
pub use models::file::FileEntry;
pub use models::options::{FileClass, OptionsOverride, UploadCallbacks, UploadOptions};
pub use models::upload::{FailureCode, Rejection, UploadOutcome, UploadTask};
pub use services::upload_engine::{QueueStep, RunSummary, Uploader};
