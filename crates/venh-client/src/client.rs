//! Enhancement backend HTTP client.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use venh_models::{BackendMethod, ProcessingMetadata, ProcessingRequest, ProcessingResult};

use crate::error::{ClientError, ClientResult};
use crate::types::{error_text, HealthResponse, ProcessResponse, ProcessingStatus, ResponseShape};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration for the enhancement client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API (including the `/api` prefix)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(600), // enhancement runs on CPU can take minutes
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VENH_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VENH_API_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Client for the enhancement backend.
///
/// Holds no per-call state; every method issues fresh requests.
#[derive(Debug, Clone)]
pub struct EnhanceClient {
    http: Client,
    base: Url,
}

impl EnhanceClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        let base = parse_base(&config.base_url)?;

        Ok(Self { http, base })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    /// Upload a video and return the enhanced result.
    ///
    /// The backend either streams the video back directly or answers with a
    /// JSON document pointing at it, in which case it is fetched separately.
    pub async fn process_video(
        &self,
        request: &ProcessingRequest,
        method: BackendMethod,
    ) -> ClientResult<ProcessingResult> {
        if request.is_empty() {
            return Err(ClientError::InvalidRequest(format!(
                "{} is empty",
                request.file_name()
            )));
        }

        let url = self.endpoint("process_video/")?;

        info!(
            file = %request.file_name(),
            size = request.size(),
            method = %method,
            "Uploading video to {}", url
        );

        let part = Part::stream_with_length(Body::from(request.data().clone()), request.size())
            .file_name(request.file_name().to_string())
            .mime_str(request.content_type())
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("method", method.as_str());

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::UploadFailed(e.to_string()))?;

        let status = response.status();
        debug!("Backend responded with {}", status);

        if !status.is_success() {
            return Err(failure_from(response).await);
        }

        let content_type = content_type_of(&response);

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
        {
            let body = read_body(response).await?;
            let parsed: ProcessResponse = serde_json::from_slice(&body)
                .map_err(|e| ClientError::malformed(format!("unreadable JSON body: {}", e)))?;

            return match parsed.into_shape() {
                ResponseShape::Indirect {
                    video_url,
                    metadata,
                } => {
                    let (video, video_type) = self.fetch_video(&video_url).await?;
                    Ok(ProcessingResult::new(video)
                        .with_content_type(video_type)
                        .with_metadata(metadata))
                }
                ResponseShape::Failure { message } => {
                    warn!("Backend reported failure: {}", message);
                    Err(ClientError::backend(Some(status.as_u16()), message))
                }
                ResponseShape::Unrecognized => Err(ClientError::malformed(
                    "JSON body has neither video_url/metadata nor an error message",
                )),
            };
        }

        let video = read_body(response).await?;
        if video.is_empty() {
            return Err(ClientError::malformed("empty response body"));
        }

        info!(bytes = video.len(), "Received enhanced video");
        Ok(ProcessingResult::new(video).with_content_type(content_type))
    }

    /// Download a processed video referenced by a `video_url`.
    ///
    /// Relative URLs resolve against the API base URL.
    pub async fn fetch_video(&self, video_url: &str) -> ClientResult<(Bytes, Option<String>)> {
        let url = self.endpoint(video_url)?;
        debug!("Fetching processed video from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let content_type = content_type_of(&response);
        let video = read_body(response).await?;
        if video.is_empty() {
            return Err(ClientError::malformed("processed video is empty"));
        }

        Ok((video, content_type))
    }

    /// Look up stored metadata for a processed file.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn video_metadata(&self, filename: &str) -> Option<ProcessingMetadata> {
        let path = format!("video_metadata/{}", urlencoding::encode(filename));

        let result: ClientResult<ProcessingMetadata> = async {
            let response = self.http.get(self.endpoint(&path)?).send().await?;
            if !response.status().is_success() {
                return Err(failure_from(response).await);
            }
            let body = read_body(response).await?;
            Ok(ProcessingMetadata::from_value(serde_json::from_slice(&body)?))
        }
        .await;

        match result {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", filename, e);
                None
            }
        }
    }

    /// Query the status of a backend job.
    pub async fn processing_status(&self, job_id: &str) -> ClientResult<ProcessingStatus> {
        let path = format!("status/{}", urlencoding::encode(job_id));
        let response = self.http.get(self.endpoint(&path)?).send().await?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let body = read_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Check if the backend is healthy.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = self.endpoint("health")?;

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => Ok(health.status == "healthy" || health.status == "ok"),
                    Err(e) => {
                        warn!("Backend health response unreadable: {}", e);
                        Ok(false)
                    }
                }
            }
            Ok(response) => {
                warn!("Backend health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Backend health check error: {}", e);
                Ok(false)
            }
        }
    }
}

fn parse_base(base_url: &str) -> ClientResult<Url> {
    // `Url::join` replaces the last segment unless the base ends with a slash.
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Ok(Url::parse(&normalized)?)
}

fn content_type_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
}

/// Read a response body. The backend has already answered at this point, so
/// a failure here is a broken response rather than a failed upload.
async fn read_body(response: Response) -> ClientResult<Bytes> {
    response
        .bytes()
        .await
        .map_err(|e| ClientError::malformed(format!("failed to read response body: {}", e)))
}

async fn failure_from(response: Response) -> ClientError {
    let status: StatusCode = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_text(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    warn!("Backend returned {}: {}", status, message);
    ClientError::backend(Some(status.as_u16()), message)
}
