use crate::config::BackendConfig;
use crate::error::{AgriScoreError, Result};
use crate::models::SensorReading;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::path::Path;

/// Multipart field the backend reads the image from.
pub const IMAGE_FIELD: &str = "file";

/// Image bytes queued for disease detection.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_image_mime(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Remote services the dashboard talks to.
///
/// Every call resolves to either a payload or one of the remote error
/// variants (`Transport`, `Protocol`, `Decode`). `detect_disease` can also
/// fail with `InvalidData` before sending when the image's content type is
/// not a valid MIME type.
pub trait AgriBackend: Send + Sync + 'static {
    /// `GET /sensor-data`
    fn fetch_sensor_history(&self) -> impl Future<Output = Result<Value>> + Send;

    /// `POST /sensor-data` with the reading as JSON. The response body is ignored.
    fn save_sensor_reading(&self, reading: SensorReading)
        -> impl Future<Output = Result<()>> + Send;

    /// `GET /recommend-crops`
    fn recommend_crops(&self) -> impl Future<Output = Result<Value>> + Send;

    /// `POST /detect-disease` as multipart form data.
    fn detect_disease(&self, image: ImageUpload) -> impl Future<Output = Result<Value>> + Send;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("agriscore/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AgriScoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("/sensor-data"))
            .send()
            .await
            .map_err(transport)?;

        Ok(response.status().is_success())
    }
}

fn transport(e: reqwest::Error) -> AgriScoreError {
    AgriScoreError::Transport(e.to_string())
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let reason = status.canonical_reason().unwrap_or_default();
    Err(AgriScoreError::protocol(status.as_u16(), reason))
}

async fn read_json(response: Response) -> Result<Value> {
    check_status(response.status())?;
    response
        .json::<Value>()
        .await
        .map_err(|e| AgriScoreError::Decode(e.to_string()))
}

impl AgriBackend for HttpBackend {
    async fn fetch_sensor_history(&self) -> Result<Value> {
        let url = self.endpoint("/sensor-data");
        tracing::debug!(%url, "GET sensor history");

        let response = self.client.get(&url).send().await.map_err(transport)?;
        read_json(response).await
    }

    async fn save_sensor_reading(&self, reading: SensorReading) -> Result<()> {
        let url = self.endpoint("/sensor-data");
        tracing::debug!(%url, "POST sensor reading");

        let response = self
            .client
            .post(&url)
            .json(&reading)
            .send()
            .await
            .map_err(transport)?;

        check_status(response.status())
    }

    async fn recommend_crops(&self) -> Result<Value> {
        let url = self.endpoint("/recommend-crops");
        tracing::debug!(%url, "GET crop recommendations");

        let response = self.client.get(&url).send().await.map_err(transport)?;
        read_json(response).await
    }

    async fn detect_disease(&self, image: ImageUpload) -> Result<Value> {
        let url = self.endpoint("/detect-disease");
        tracing::debug!(%url, file = %image.file_name, bytes = image.bytes.len(), "POST disease image");

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| AgriScoreError::InvalidData(format!("Bad content type: {}", e)))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }
}
