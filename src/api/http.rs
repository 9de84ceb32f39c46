//! HttpUploadApi: reqwest implementation of `UploadApi`.
//!
//! Sends each file as `multipart/form-data` with a single part named after
//! the task's file id, tagged with `X-Requested-With: XMLHttpRequest` so
//! endpoints written for browser form posts accept it.

use reqwest::StatusCode;
use tokio::io::AsyncReadExt;

use super::{FileUploadParams, ProgressFn, UploadApi};
use crate::error::AppError;
use crate::models::options::parse_endpoint;

const USER_AGENT: &str = concat!("drop-uploader/", env!("CARGO_PKG_VERSION"));
const REQUESTED_WITH: &str = "XMLHttpRequest";
/// Body is streamed in slices of this size; each slice is one progress tick.
pub const PROGRESS_SLICE_BYTES: usize = 64 * 1024;

pub struct HttpUploadApi {
    client: reqwest::Client,
}

impl HttpUploadApi {
    pub fn new() -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Build the single-part form carrying the file contents.
    pub(crate) async fn build_form(
        params: &FileUploadParams,
    ) -> crate::error::Result<reqwest::multipart::Form> {
        let (body, total) = file_body(&params.file_path, params.on_progress.clone()).await?;

        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(params.file_name.clone())
            .mime_str(&params.mime_type)
            .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))?;

        Ok(reqwest::multipart::Form::new().part(params.file_id.to_string(), part))
    }
}

impl UploadApi for HttpUploadApi {
    async fn upload_file(
        &self,
        params: FileUploadParams,
    ) -> crate::error::Result<serde_json::Value> {
        let endpoint = parse_endpoint(&params.endpoint_url)?;
        let form = Self::build_form(&params).await?;

        let mut request = self
            .client
            .post(endpoint)
            .header("X-Requested-With", REQUESTED_WITH)
            .multipart(form);
        if let Some(timeout) = params.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            return Err(AppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            log::warn!(
                "File {} got a non-JSON success body: {}",
                params.file_id,
                e
            );
            AppError::Api {
                status: status.as_u16(),
                body,
            }
        })
    }
}

/// Open a file as a streaming request body, returning it with its length.
pub async fn file_body(
    file_path: &str,
    on_progress: Option<ProgressFn>,
) -> crate::error::Result<(reqwest::Body, u64)> {
    let file = tokio::fs::File::open(file_path).await?;
    let total = file.metadata().await?.len();
    let slices = file_slices(file, total, on_progress);
    Ok((reqwest::Body::wrap_stream(slices), total))
}

/// Read `file` in slices of at most `PROGRESS_SLICE_BYTES`, stopping after
/// `total` bytes. `on_progress` receives `(sent, total)` as each slice is
/// handed to the connection.
fn file_slices(
    file: tokio::fs::File,
    total: u64,
    on_progress: Option<ProgressFn>,
) -> impl futures::Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
    futures::stream::try_unfold((file, 0u64), move |(mut file, sent)| {
        let on_progress = on_progress.clone();
        async move {
            let want = total.saturating_sub(sent).min(PROGRESS_SLICE_BYTES as u64);
            if want == 0 {
                return Ok(None);
            }
            let mut slice = Vec::with_capacity(want as usize);
            (&mut file).take(want).read_to_end(&mut slice).await?;
            if slice.is_empty() {
                return Ok(None);
            }

            let sent = sent + slice.len() as u64;
            if let Some(cb) = &on_progress {
                cb(sent, total);
            }
            Ok::<_, std::io::Error>(Some((slice, (file, sent))))
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::Multipart;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use futures::TryStreamExt;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use super::*;

    async fn spawn_endpoint(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/upload", addr)
    }

    async fn echo(headers: HeaderMap, mut multipart: Multipart) -> Json<Value> {
        let requested_with = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let len = field.bytes().await.unwrap().len();
            fields.push(json!({
                "name": name,
                "fileName": file_name,
                "contentType": content_type,
                "len": len,
            }));
        }
        Json(json!({ "requestedWith": requested_with, "fields": fields }))
    }

    fn write_fixture(dir: &tempfile::TempDir, name: &str, len: usize) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![7u8; len]).unwrap();
        path.to_string_lossy().to_string()
    }

    fn params(file_id: u64, file_path: String, endpoint_url: String) -> FileUploadParams {
        FileUploadParams {
            file_id,
            file_name: "photo.png".into(),
            file_path,
            mime_type: "image/png".into(),
            endpoint_url,
            timeout: None,
            on_progress: None,
        }
    }

    #[tokio::test]
    async fn test_upload_sends_single_field_named_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 1000);
        let url = spawn_endpoint(Router::new().route("/upload", post(echo))).await;

        let api = HttpUploadApi::new().unwrap();
        let body = api.upload_file(params(5, path, url)).await.unwrap();

        assert_eq!(body["requestedWith"], "XMLHttpRequest");
        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["name"], "5");
        assert_eq!(fields[0]["fileName"], "photo.png");
        assert_eq!(fields[0]["contentType"], "image/png");
        assert_eq!(fields[0]["len"], 1000);
    }

    #[tokio::test]
    async fn test_upload_reports_progress_up_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let len = PROGRESS_SLICE_BYTES * 2 + 10;
        let path = write_fixture(&dir, "photo.png", len);
        let url = spawn_endpoint(Router::new().route("/upload", post(echo))).await;

        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();
        let mut p = params(1, path, url);
        p.on_progress = Some(Arc::new(move |loaded: u64, total: u64| {
            sink.lock().push((loaded, total));
        }));

        let api = HttpUploadApi::new().unwrap();
        api.upload_file(p).await.unwrap();

        let ticks = ticks.lock();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks.last(), Some(&(len as u64, len as u64)));
        assert!(ticks.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[tokio::test]
    async fn test_non_200_is_api_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 10);
        let app = Router::new().route(
            "/upload",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = spawn_endpoint(app).await;

        let api = HttpUploadApi::new().unwrap();
        match api.upload_file(params(2, path, url)).await.unwrap_err() {
            AppError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected AppError::Api, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_api_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 10);
        let app = Router::new().route("/upload", post(|| async { "plain text" }));
        let url = spawn_endpoint(app).await;

        let api = HttpUploadApi::new().unwrap();
        let err = api.upload_file(params(3, path, url)).await.unwrap_err();
        assert!(matches!(err, AppError::Api { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 10);
        let app = Router::new().route(
            "/upload",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let url = spawn_endpoint(app).await;

        let mut p = params(4, path, url);
        p.timeout = Some(Duration::from_millis(100));
        let api = HttpUploadApi::new().unwrap();
        let err = api.upload_file(p).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout), "got: {:?}", err);
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 10);
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpUploadApi::new().unwrap();
        let err = api
            .upload_file(params(6, path, format!("http://{}/upload", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Network(_)), "got: {:?}", err);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_internal_error() {
        let api = HttpUploadApi::new().unwrap();
        let err = api
            .upload_file(params(0, "/nonexistent".into(), String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_schemeless_endpoint_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "photo.png", 10);

        let api = HttpUploadApi::new().unwrap();
        let err = api
            .upload_file(params(7, path, "localhost/upload".into()))
            .await
            .unwrap_err();
        match &err {
            AppError::Internal(msg) => assert!(msg.contains("localhost/upload")),
            other => panic!("Expected AppError::Internal, got: {:?}", other),
        }
        assert!(!crate::services::retry::is_retryable(&err));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let api = HttpUploadApi::new().unwrap();
        let err = api
            .upload_file(params(
                8,
                "/nonexistent/path/file.bin".into(),
                "http://127.0.0.1:9/upload".into(),
            ))
            .await
            .unwrap_err();
        match err {
            AppError::Io(_) => {}
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slices_stop_at_opened_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "grown.bin", 100);

        let file = tokio::fs::File::open(&path).await.unwrap();
        let slices: Vec<Vec<u8>> = file_slices(file, 40, None).try_collect().await.unwrap();
        assert_eq!(slices.iter().map(Vec::len).sum::<usize>(), 40);
    }

    #[tokio::test]
    async fn test_file_is_read_in_bounded_slices() {
        let dir = tempfile::tempdir().unwrap();
        let len = PROGRESS_SLICE_BYTES * 3;
        let path = write_fixture(&dir, "big.bin", len);

        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();
        let progress: ProgressFn = Arc::new(move |loaded: u64, total: u64| {
            sink.lock().push((loaded, total));
        });

        let file = tokio::fs::File::open(&path).await.unwrap();
        let slices: Vec<Vec<u8>> = file_slices(file, len as u64, Some(progress))
            .try_collect()
            .await
            .unwrap();
        let sizes: Vec<usize> = slices.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![PROGRESS_SLICE_BYTES; 3]);
        assert_eq!(ticks.lock().last(), Some(&(len as u64, len as u64)));
    }
}
