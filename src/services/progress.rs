//! Progress reporter: forwards body-streaming ticks for one task to the
//! `on_upload_progress` callback, at most once per interval.
//!
//! The final tick (`loaded == total`) is always forwarded so callers see the
//! upload reach 100%.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::api::ProgressFn;
use crate::models::options::ProgressCallback;

pub struct ProgressReporter {
    file_id: u64,
    interval: Duration,
    last_emit: Mutex<Option<Instant>>,
    callback: ProgressCallback,
}

impl ProgressReporter {
    pub fn new(file_id: u64, interval: Duration, callback: ProgressCallback) -> Arc<Self> {
        Arc::new(Self {
            file_id,
            interval,
            last_emit: Mutex::new(None),
            callback,
        })
    }

    pub fn report(&self, loaded: u64, total: u64) {
        let now = Instant::now();
        {
            let mut last = self.last_emit.lock();
            let due = loaded >= total
                || last.map_or(true, |at| now.duration_since(at) >= self.interval);
            if !due {
                return;
            }
            *last = Some(now);
        }
        (self.callback)(self.file_id, loaded, total);
    }

    /// Adapter handed to the API layer.
    pub fn into_progress_fn(self: Arc<Self>) -> ProgressFn {
        Arc::new(move |loaded: u64, total: u64| self.report(loaded, total))
    }
}
