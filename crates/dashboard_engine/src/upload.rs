use std::path::Path;
use std::time::Duration;

use dashboard_logging::{dash_info, dash_warn};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:9000/input/upload-upi";

const FALLBACK_DETAIL: &str = "Server returned an error";
const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub endpoint: Url,
    pub request_timeout: Duration,
    /// Lowercase extensions without the dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadSettings {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            request_timeout: Duration::from_secs(60),
            allowed_extensions: vec!["txt".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    /// Response body when it parsed as JSON.
    pub body: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{path} is not an accepted upload file (expected .{expected})")]
    InvalidFile { path: String, expected: String },
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("upload rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("upload timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
    client: reqwest::Client,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { settings, client })
    }

    fn is_accepted(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.settings
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, UploadError> {
        let display = path.display().to_string();
        if !self.is_accepted(path) {
            return Err(UploadError::InvalidFile {
                path: display,
                expected: self.settings.allowed_extensions.join(", ."),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| UploadError::Io {
                path: display.clone(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.txt".to_string());

        dash_info!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            self.settings.endpoint
        );
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/plain")
            .map_err(map_reqwest_error)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(self.settings.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed: Option<Value> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let detail = rejection_detail(parsed.as_ref());
            dash_warn!("Upload of {} rejected ({}): {}", display, status, detail);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(UploadReceipt {
            status: status.as_u16(),
            body: parsed,
        })
    }
}

/// `detail` from the error body, or a generic message.
fn rejection_detail(body: Option<&Value>) -> String {
    match body.and_then(|value| value.get("detail")) {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => FALLBACK_DETAIL.to_string(),
        Some(other) => other.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Network(err.to_string())
    }
}
