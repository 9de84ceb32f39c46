//! Drop zone: binds drag-lifecycle events to an uploader.
//!
//! The host forwards every drag event it sees; events aimed at another
//! target are ignored. `dispatch` returns `true` when the host must suppress
//! its default handling (opening or navigating to the dropped file).

use std::sync::Arc;

use crate::api::UploadApi;
use crate::models::event::{DragEvent, DragEventKind, DOCUMENT_TARGET};
use crate::models::upload::Rejection;
use crate::services::upload_engine::{RunSummary, Uploader};
use crate::services::validator;

pub struct DropZone<A: UploadApi + 'static> {
    uploader: Arc<Uploader<A>>,
}

impl<A: UploadApi + 'static> DropZone<A> {
    pub fn bind(uploader: Arc<Uploader<A>>) -> Self {
        log::debug!("Drop zone bound to target '{}'", uploader.options().target);
        Self { uploader }
    }

    pub fn uploader(&self) -> &Arc<Uploader<A>> {
        &self.uploader
    }

    pub fn accepts(&self, event: &DragEvent) -> bool {
        let target = &self.uploader.options().target;
        target == DOCUMENT_TARGET || *target == event.target
    }

    pub fn dispatch(&self, event: &DragEvent) -> bool {
        if !self.accepts(event) {
            return false;
        }

        let callbacks = self.uploader.callbacks();
        let slot = match event.kind {
            DragEventKind::Enter => &callbacks.on_drag_enter,
            DragEventKind::Leave => &callbacks.on_drag_leave,
            DragEventKind::Over => &callbacks.on_drag_over,
            DragEventKind::Drop => {
                self.handle_drop(event);
                return true;
            }
        };
        if let Some(cb) = slot {
            cb(event);
        }
        true
    }

    fn handle_drop(&self, event: &DragEvent) {
        if let Err(rejection) = validator::check_files(&event.files, self.uploader.options()) {
            self.notify(&rejection);
            return;
        }

        if let Err(rejection) = self.uploader.add_files(&event.files) {
            // The drop itself was valid; the drop callback still fires.
            self.notify(&rejection);
        }

        if let Some(cb) = &self.uploader.callbacks().on_drop {
            cb(event);
        }

        if self.uploader.options().auto_start {
            self.start();
        }
    }

    fn notify(&self, rejection: &Rejection) {
        log::warn!("Drop rejected: {}", rejection);
        if let Some(cb) = &self.uploader.callbacks().on_rejected {
            cb(rejection);
        }
    }

    /// Spawn the upload runner on the current tokio runtime. Returns `None`
    /// when called outside a runtime.
    pub fn start(&self) -> Option<tokio::task::JoinHandle<RunSummary>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Cannot start uploads outside a tokio runtime: {}", e);
                return None;
            }
        };
        let uploader = self.uploader.clone();
        Some(handle.spawn(async move { uploader.run().await }))
    }
}
