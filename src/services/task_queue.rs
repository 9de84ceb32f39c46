//! Pending and failed task queues plus the file id counter.

use std::collections::VecDeque;

use crate::models::file::FileEntry;
use crate::models::upload::{Rejection, UploadTask};

/// FIFO of tasks awaiting upload and the list of tasks whose last attempt
/// failed in a retryable way. A task lives in at most one of the two.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<UploadTask>,
    failed: Vec<UploadTask>,
    next_file_id: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one task per file, assigning fresh ids in drop order.
    ///
    /// Refused outright when the pending queue already holds
    /// `max_pending` tasks before the call.
    pub fn add_files(
        &mut self,
        files: &[FileEntry],
        max_pending: usize,
    ) -> Result<Vec<u64>, Rejection> {
        if self.pending.len() >= max_pending {
            return Err(Rejection::QueueFull { max: max_pending });
        }

        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let file_id = self.next_file_id;
            self.next_file_id += 1;
            self.pending.push_back(UploadTask::new(file_id, file.clone()));
            ids.push(file_id);
        }
        Ok(ids)
    }

    /// Remove the pending task with `file_id`. Id 0 is a regular id.
    pub fn remove_task(&mut self, file_id: u64) -> Option<UploadTask> {
        let index = self.pending.iter().position(|t| t.file_id == file_id)?;
        self.pending.remove(index)
    }

    pub fn enqueue_failed(&mut self, task: UploadTask) {
        self.failed.push(task);
    }

    pub fn next_task(&mut self) -> Option<UploadTask> {
        self.pending.pop_front()
    }

    /// Move every failed task to the front of the pending queue, keeping
    /// their order. Returns how many were moved.
    pub fn recycle_failed(&mut self) -> usize {
        let moved = self.failed.len();
        for task in self.failed.drain(..).rev() {
            self.pending.push_front(task);
        }
        moved
    }

    pub fn pending(&self) -> impl Iterator<Item = &UploadTask> {
        self.pending.iter()
    }

    pub fn failed(&self) -> impl Iterator<Item = &UploadTask> {
        self.failed.iter()
    }

    pub fn pending_ids(&self) -> Vec<u64> {
        self.pending.iter().map(|t| t.file_id).collect()
    }

    pub fn failed_ids(&self) -> Vec<u64> {
        self.failed.iter().map(|t| t.file_id).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn failed_len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.failed.is_empty()
    }
}
