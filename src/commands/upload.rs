//! Uploader initialization and lifecycle entry points.

use std::path::Path;
use std::sync::Arc;

use crate::api::http::HttpUploadApi;
use crate::api::UploadApi;
use crate::commands::drop_zone::DropZone;
use crate::models::options::{OptionsOverride, UploadCallbacks, UploadOptions};
use crate::services::upload_engine::{RunSummary, Uploader};
use crate::storage::settings;

/// Merge caller options and callbacks over the defaults, then bind a drop
/// zone to a fresh uploader.
pub fn init<A: UploadApi + 'static>(
    custom: Option<OptionsOverride>,
    callbacks: Option<UploadCallbacks>,
    api: A,
) -> DropZone<A> {
    let options = UploadOptions::build(custom, UploadOptions::default());
    let callbacks = UploadCallbacks::build(callbacks, UploadCallbacks::logging());
    log::info!(
        "Drop uploader ready: target='{}', endpoint='{}', class={}, max {} MiB x {} files",
        options.target,
        options.endpoint_url,
        options.file_class,
        options.max_size_mib,
        options.max_batch_count
    );
    if let Err(e) = options.endpoint() {
        log::warn!("Uploads will fail until the endpoint is fixed: {}", e);
    }
    DropZone::bind(Arc::new(Uploader::new(options, callbacks, api)))
}

/// `init` over HTTP, reading option overrides from a JSON file.
pub fn init_from_file(
    path: impl AsRef<Path>,
    callbacks: Option<UploadCallbacks>,
) -> crate::error::Result<DropZone<HttpUploadApi>> {
    let custom = settings::load_overrides(path)?;
    Ok(init(Some(custom), callbacks, HttpUploadApi::new()?))
}

/// Drain the drop zone's queue on the current task.
pub async fn start_upload<A: UploadApi + 'static>(zone: &DropZone<A>) -> RunSummary {
    zone.uploader().run().await
}
