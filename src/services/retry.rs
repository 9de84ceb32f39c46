//! Failure classification and the re-enqueue rule.
//!
//! Transport errors and timeouts are retryable: the task goes back through
//! the failed queue. Everything else (non-200 answers, unreadable files,
//! misconfiguration) is terminal and the task is discarded.

use crate::error::AppError;
use crate::models::upload::{UploadOutcome, UploadTask};

pub fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::Network(_) | AppError::Timeout => true,
        AppError::Api { .. }
        | AppError::Io(_)
        | AppError::Json(_)
        | AppError::Storage(_)
        | AppError::Internal(_) => false,
    }
}

/// Turn the result of one upload attempt into its typed outcome.
pub fn classify(result: crate::error::Result<serde_json::Value>) -> UploadOutcome {
    let err = match result {
        Ok(body) => return UploadOutcome::Succeeded(body),
        Err(err) => err,
    };
    if is_retryable(&err) {
        return match err {
            AppError::Timeout => UploadOutcome::TimedOut,
            AppError::Network(msg) => UploadOutcome::TransportError(msg),
            other => UploadOutcome::TransportError(other.to_string()),
        };
    }
    match err {
        AppError::Api { status, .. } => UploadOutcome::ApplicationError {
            status: Some(status),
        },
        other => {
            log::error!("Upload attempt failed locally: {}", other);
            UploadOutcome::ApplicationError { status: None }
        }
    }
}

/// Whether a task that just failed retryably may go back to the failed
/// queue. `max_retries` of `None` never gives up.
pub fn should_requeue(task: &UploadTask, max_retries: Option<u32>) -> bool {
    match max_retries {
        Some(max) => task.attempts <= max,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::FileEntry;

    fn task_with_attempts(attempts: u32) -> UploadTask {
        let mut task = UploadTask::new(0, FileEntry::new("a", "/tmp/a", 1, "text/plain"));
        task.attempts = attempts;
        task
    }

    #[test]
    fn test_is_retryable_network_error() {
        assert!(is_retryable(&AppError::Network("connection reset".into())));
    }

    #[test]
    fn test_is_retryable_timeout() {
        assert!(is_retryable(&AppError::Timeout));
    }

    #[test]
    fn test_not_retryable_api_error() {
        let err = AppError::Api {
            status: 503,
            body: String::new(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_not_retryable_io_error() {
        assert!(!is_retryable(&AppError::Io("file not found".into())));
    }

    #[test]
    fn test_classify_success() {
        let outcome = classify(Ok(serde_json::json!({"ok": true})));
        assert_eq!(outcome, UploadOutcome::Succeeded(serde_json::json!({"ok": true})));
    }

    #[test]
    fn test_classify_api_error_keeps_status() {
        let outcome = classify(Err(AppError::Api {
            status: 404,
            body: "missing".into(),
        }));
        assert_eq!(outcome, UploadOutcome::ApplicationError { status: Some(404) });
    }

    #[test]
    fn test_classify_transport_and_timeout() {
        assert_eq!(
            classify(Err(AppError::Network("refused".into()))),
            UploadOutcome::TransportError("refused".into())
        );
        assert_eq!(classify(Err(AppError::Timeout)), UploadOutcome::TimedOut);
    }

    #[test]
    fn test_classify_local_failure_is_terminal() {
        let outcome = classify(Err(AppError::Io("gone".into())));
        assert_eq!(outcome, UploadOutcome::ApplicationError { status: None });
        assert!(!outcome.is_retryable());
    }

    #[test]
    fn test_classify_misconfigured_endpoint_is_terminal() {
        let outcome = classify(Err(AppError::Internal(
            "Invalid upload endpoint 'localhost/upload'".into(),
        )));
        assert_eq!(outcome, UploadOutcome::ApplicationError { status: None });
        assert!(!outcome.is_retryable());
    }

    #[test]
    fn test_should_requeue_unbounded() {
        assert!(should_requeue(&task_with_attempts(1), None));
        assert!(should_requeue(&task_with_attempts(1000), None));
    }

    #[test]
    fn test_should_requeue_respects_cap() {
        // One retry allowed: requeue after the first attempt, not after the second.
        assert!(should_requeue(&task_with_attempts(1), Some(1)));
        assert!(!should_requeue(&task_with_attempts(2), Some(1)));
        assert!(!should_requeue(&task_with_attempts(1), Some(0)));
    }
}
