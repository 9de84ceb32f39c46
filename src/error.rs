//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("endpoint rejected upload: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("io error: {0}")]
    Io(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AppError::Timeout;
        }
        // Malformed URL or request; never retried.
        if err.is_builder() {
            return AppError::Internal(format!("invalid request: {}", err));
        }
        match err.status() {
            Some(status) => AppError::Api {
                status: status.as_u16(),
                body: String::new(),
            },
            None => AppError::Network(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        match err {
            AppError::Io(msg) => assert!(msg.contains("gone")),
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
    }

    #[test]
    fn json_error_converts() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[test]
    fn reqwest_builder_error_is_internal() {
        let err = reqwest::Client::new()
            .post("localhost/upload")
            .build()
            .unwrap_err();
        assert!(err.is_builder());
        match AppError::from(err) {
            AppError::Internal(msg) => assert!(msg.contains("invalid request")),
            other => panic!("Expected AppError::Internal, got: {:?}", other),
        }
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = AppError::Api {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "endpoint rejected upload: status=502, body=bad gateway"
        );
    }
}
