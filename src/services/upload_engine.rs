//! Upload engine: drains the task queue one file at a time.
//!
//! Each attempt resolves to an `UploadOutcome`; the `run` driver loop reads
//! the outcome and decides whether to dispatch the next task. Only one
//! request is ever in flight per uploader.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::api::{FileUploadParams, UploadApi};
use crate::models::file::FileEntry;
use crate::models::options::{UploadCallbacks, UploadOptions};
use crate::models::upload::{FailureCode, Rejection, UploadOutcome, UploadTask};
use crate::services::progress::ProgressReporter;
use crate::services::retry;
use crate::services::task_queue::TaskQueue;

pub const TRANSPORT_FAILED_MESSAGE: &str = "upload failed";
pub const TIMED_OUT_MESSAGE: &str = "upload timed out";

/// Result of one `process_queue` call.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueStep {
    /// Both queues were empty.
    Idle,
    /// Pending was empty; this many failed tasks were moved back to it.
    /// They are dispatched by the next call, not this one.
    Recycled(usize),
    Uploaded { file_id: u64, outcome: UploadOutcome },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<u64>,
    pub failed_terminal: Vec<u64>,
    pub failed_retryable: Vec<u64>,
    pub recycled: usize,
}

impl RunSummary {
    fn record(&mut self, file_id: u64, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Succeeded(_) => self.succeeded.push(file_id),
            UploadOutcome::ApplicationError { .. } => self.failed_terminal.push(file_id),
            UploadOutcome::TransportError(_) | UploadOutcome::TimedOut => {
                self.failed_retryable.push(file_id)
            }
        }
    }
}

pub struct Uploader<A: UploadApi> {
    options: UploadOptions,
    callbacks: UploadCallbacks,
    api: A,
    queue: Mutex<TaskQueue>,
    /// Held for the whole of one attempt.
    in_flight: tokio::sync::Mutex<()>,
    running: AtomicBool,
}

impl<A: UploadApi> Uploader<A> {
    pub fn new(options: UploadOptions, callbacks: UploadCallbacks, api: A) -> Self {
        Self {
            options,
            callbacks,
            api,
            queue: Mutex::new(TaskQueue::new()),
            in_flight: tokio::sync::Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn callbacks(&self) -> &UploadCallbacks {
        &self.callbacks
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn add_files(&self, files: &[FileEntry]) -> Result<Vec<u64>, Rejection> {
        let ids = self
            .queue
            .lock()
            .add_files(files, self.options.max_batch_count)?;
        log::info!("Queued {} file(s): ids={:?}", ids.len(), ids);
        Ok(ids)
    }

    pub fn remove_task(&self, file_id: u64) -> Option<UploadTask> {
        self.queue.lock().remove_task(file_id)
    }

    pub fn enqueue_failed(&self, task: UploadTask) {
        self.queue.lock().enqueue_failed(task);
    }

    pub fn pending_ids(&self) -> Vec<u64> {
        self.queue.lock().pending_ids()
    }

    pub fn failed_ids(&self) -> Vec<u64> {
        self.queue.lock().failed_ids()
    }

    /// Snapshot of the pending and failed tasks.
    pub fn snapshot(&self) -> (Vec<UploadTask>, Vec<UploadTask>) {
        let queue = self.queue.lock();
        (queue.pending().cloned().collect(), queue.failed().cloned().collect())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// One scheduling step: upload the head of the pending queue, or, when
    /// pending is empty, move the failed tasks back into it and stop.
    pub async fn process_queue(&self) -> QueueStep {
        let _slot = self.in_flight.lock().await;

        let next = {
            let mut queue = self.queue.lock();
            match queue.next_task() {
                Some(task) => Ok(task),
                None => Err(queue.recycle_failed()),
            }
        };

        match next {
            Ok(task) => {
                let file_id = task.file_id;
                let outcome = self.upload(task).await;
                QueueStep::Uploaded { file_id, outcome }
            }
            Err(0) => QueueStep::Idle,
            Err(moved) => {
                log::info!("Re-queued {} failed upload(s) for the next pass", moved);
                QueueStep::Recycled(moved)
            }
        }
    }

    /// Upload one task and report its outcome through the callbacks.
    /// Retryable failures put the task on the failed queue.
    async fn upload(&self, mut task: UploadTask) -> UploadOutcome {
        task.attempts += 1;
        let file_id = task.file_id;

        if let Some(cb) = &self.callbacks.on_upload_start {
            cb(file_id);
        }
        log::info!(
            "Uploading file {} ('{}', {} bytes, attempt {})",
            file_id,
            task.name,
            task.size,
            task.attempts
        );

        let on_progress = self.callbacks.on_upload_progress.clone().map(|cb| {
            ProgressReporter::new(
                file_id,
                Duration::from_millis(self.options.progress_interval_ms),
                cb,
            )
            .into_progress_fn()
        });
        let params = FileUploadParams {
            file_id,
            file_name: task.name.clone(),
            file_path: task.file.file_path.clone(),
            mime_type: task.file.mime_type.clone(),
            endpoint_url: self.options.endpoint_url.clone(),
            timeout: self.options.timeout(),
            on_progress,
        };

        let outcome = retry::classify(self.api.upload_file(params).await);

        match &outcome {
            UploadOutcome::Succeeded(body) => {
                log::info!("File {} upload success", file_id);
                if let Some(cb) = &self.callbacks.on_upload_success {
                    cb(file_id, body);
                }
            }
            UploadOutcome::ApplicationError { status } => {
                log::warn!("File {} rejected by endpoint: status={:?}", file_id, status);
                if let Some(cb) = &self.callbacks.on_upload_failed {
                    cb(file_id, FailureCode::Application, None);
                }
            }
            UploadOutcome::TransportError(msg) => {
                log::warn!("File {} upload failed: {}", file_id, msg);
                self.requeue(task);
                if let Some(cb) = &self.callbacks.on_upload_failed {
                    cb(file_id, FailureCode::Transport, Some(TRANSPORT_FAILED_MESSAGE));
                }
            }
            UploadOutcome::TimedOut => {
                log::warn!("File {} upload timed out", file_id);
                self.requeue(task);
                if let Some(cb) = &self.callbacks.on_upload_failed {
                    cb(file_id, FailureCode::Timeout, Some(TIMED_OUT_MESSAGE));
                }
            }
        }

        outcome
    }

    fn requeue(&self, task: UploadTask) {
        if retry::should_requeue(&task, self.options.max_retries) {
            self.enqueue_failed(task);
        } else {
            log::warn!(
                "File {} dropped after {} attempt(s)",
                task.file_id,
                task.attempts
            );
        }
    }

    /// Drive the queue until it is drained. Returns immediately with an
    /// empty summary if another `run` is already active.
    ///
    /// A pass stops when pending is empty (after moving failed tasks back),
    /// or after a retryable failure when `continue_after_failure` is off.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        if self.running.swap(true, Ordering::AcqRel) {
            log::debug!("Upload runner already active");
            return summary;
        }

        loop {
            let drained = self.drain(&mut summary).await;
            self.running.store(false, Ordering::Release);

            // A drop may have been enqueued after the last empty check.
            let raced = drained && self.queue.lock().pending_len() > 0;
            if !raced || self.running.swap(true, Ordering::AcqRel) {
                break;
            }
        }

        log::info!(
            "Upload pass finished: {} succeeded, {} rejected, {} to retry",
            summary.succeeded.len(),
            summary.failed_terminal.len(),
            summary.failed_retryable.len()
        );
        summary
    }

    /// Returns true when the pass ended because both queues were empty.
    async fn drain(&self, summary: &mut RunSummary) -> bool {
        loop {
            match self.process_queue().await {
                QueueStep::Idle => return true,
                QueueStep::Recycled(moved) => {
                    summary.recycled += moved;
                    return false;
                }
                QueueStep::Uploaded { file_id, outcome } => {
                    summary.record(file_id, &outcome);
                    if outcome.is_retryable() && !self.options.continue_after_failure {
                        return false;
                    }
                }
            }
        }
    }
}
