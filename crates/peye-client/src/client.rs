//! Prediction service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use peye_media::RasterBlob;
use peye_models::PredictionResult;

use crate::error::{ClientResult, PredictionError};

/// Longest response body excerpt kept in errors.
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the prediction client.
#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    /// Base URL of the prediction service
    pub base_url: String,
    /// Path of the classification endpoint
    pub predict_path: String,
    /// Path answering liveness probes
    pub health_path: String,
    /// Multipart field carrying the image
    pub field_name: String,
    /// File name attached to the uploaded part
    pub file_name: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl Default for PredictionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            predict_path: "/predict".to_string(),
            health_path: "/".to_string(),
            field_name: "file".to_string(),
            file_name: "snake_crop.jpg".to_string(),
            timeout: None,
        }
    }
}

impl PredictionClientConfig {
    /// Default config pointed at another service instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("Unsupported URL scheme: {}", url.scheme()));
        }
        if self.field_name.is_empty() || self.file_name.is_empty() {
            return Err("Upload field and file name must not be empty".to_string());
        }
        Ok(())
    }

    pub fn predict_url(&self) -> String {
        join_url(&self.base_url, &self.predict_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Anything that can classify a rasterized crop.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, blob: &RasterBlob) -> ClientResult<PredictionResult>;
}

/// Liveness response body.
#[derive(Debug, Clone, Deserialize)]
struct HealthResponse {
    message: String,
}

/// Client for the prediction service.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    config: PredictionClientConfig,
}

impl PredictionClient {
    /// Create a new prediction client.
    pub fn new(config: PredictionClientConfig) -> ClientResult<Self> {
        config.validate().map_err(PredictionError::Config)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PredictionError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PredictionClientConfig {
        &self.config
    }

    /// Check if the prediction service is up.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = self.config.health_url();

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => {
                        debug!("Prediction service health: {}", health.message);
                        Ok(true)
                    }
                    Err(e) => {
                        warn!("Prediction service health response unreadable: {}", e);
                        Ok(false)
                    }
                }
            }
            Ok(response) => {
                warn!("Prediction service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Prediction service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Upload `blob` and parse the classification.
    ///
    /// Any non-2xx status, transport failure, or unparseable body is an
    /// error; no partial result is ever returned.
    pub async fn submit(&self, blob: &RasterBlob) -> ClientResult<PredictionResult> {
        let url = self.config.predict_url();

        let part = Part::bytes(blob.bytes.clone())
            .file_name(self.config.file_name.clone())
            .mime_str(blob.mime)?;
        let form = Form::new().part(self.config.field_name.clone(), part);

        debug!(
            url = %url,
            bytes = blob.len(),
            width = blob.width,
            height = blob.height,
            "Submitting crop for prediction"
        );

        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let result = PredictionResult::from_json(&body)?;

        info!(
            species = %result.main.species,
            venom_status = %result.main.venom_status,
            confidence = %result.main.confidence,
            alternatives = result.others.len(),
            "Prediction received"
        );

        Ok(result)
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, blob: &RasterBlob) -> ClientResult<PredictionResult> {
        self.submit(blob).await
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
