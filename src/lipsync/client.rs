//! LipsyncClient - submits lip-sync jobs, polls their status and downloads results.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use super::media::{audio_media, face_media};
use crate::cancel::CancelToken;

/// Default base URL for the lip-sync API.
pub const DEFAULT_BASE_URL: &str = "https://api.gaimin.gg";

/// Path of the jobs collection, relative to the base URL.
pub const JOBS_PATH: &str = "/api/lip-sync/jobs";

/// Where the finished video is written unless told otherwise.
pub const DEFAULT_OUTPUT_FILE: &str = "lipsync_result.mp4";

/// Delay between status checks (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Only connecting is bounded; uploads and downloads of whole videos may
/// legitimately take as long as the link needs.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<SubmitData>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: StatusData,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: String,
    #[serde(default)]
    result_url: Option<String>,
    /// Shape is not fixed by the API; strings and objects are both seen.
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Server-side state of a job, as observed by one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Finished; the result can be fetched from `result_url`.
    Completed { result_url: String },
    /// Finished unsuccessfully.
    Failed { error: Option<String> },
    /// Any non-terminal status (`PENDING`, `PROCESSING`, ...), kept verbatim.
    Waiting(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Waiting(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Completed { .. } => write!(f, "COMPLETED"),
            JobStatus::Failed { .. } => write!(f, "FAILED"),
            JobStatus::Waiting(raw) => write!(f, "{}", raw),
        }
    }
}

/// How a wait on a job ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The result was downloaded to this path.
    Completed(PathBuf),
    /// The server reported the job as failed.
    Failed { error: Option<String> },
    /// The caller cancelled the wait.
    Cancelled,
}

/// Polling behaviour for [`LipsyncClient::wait_for_job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between status checks.
    pub interval: Duration,
    /// Give up with `LipsyncError::Timeout` after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// Client for the lip-sync jobs API.
pub struct LipsyncClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl LipsyncClient {
    /// Create a client against the public API.
    pub fn with_api_key(api_key: String) -> Result<Self, LipsyncError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (e.g. a mock server).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, LipsyncError> {
        if api_key.is_empty() {
            return Err(LipsyncError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> String {
        format!("Basic {}", self.api_key)
    }

    /// Submit a lip-sync job and return its identifier.
    ///
    /// The face format is validated before anything is read or sent, so an
    /// unsupported file never reaches the network.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if the face extension is not a known image or video type
    /// - `Io` if either input cannot be read
    /// - `Http` if the request cannot be sent
    /// - `Rejected` if the API answers `success: false`
    /// - `Api` for any other non-2xx response or a malformed body
    pub async fn submit(&self, face_path: &Path, audio_path: &Path) -> Result<String, LipsyncError> {
        let face = face_media(face_path)?;
        let audio = audio_media(audio_path);

        let descriptor = serde_json::json!({
            "face_format": face.format,
            "static": face.is_static,
        });

        let face_bytes = tokio::fs::read(face_path).await?;
        let audio_bytes = tokio::fs::read(audio_path).await?;

        let form = Form::new()
            .part(
                "json",
                Part::text(descriptor.to_string()).mime_str("application/json")?,
            )
            .part(
                "face",
                Part::bytes(face_bytes)
                    .file_name(face.upload_name())
                    .mime_str(&face.content_type)?,
            )
            .part(
                "audio",
                Part::bytes(audio_bytes)
                    .file_name(audio.upload_name())
                    .mime_str(&audio.content_type)?,
            );

        let url = format!("{}{}", self.base_url, JOBS_PATH);
        log::info!(
            "Submitting job to {} (face_format={}, static={})",
            url,
            face.format,
            face.is_static
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<SubmitResponse> = serde_json::from_str(&body).ok();

        // An explicit rejection body wins over the HTTP status.
        match parsed {
            Some(SubmitResponse {
                success: false,
                error: Some(error),
                ..
            }) => {
                log::warn!("Job rejected: {} ({})", error.kind, error.description);
                Err(LipsyncError::Rejected {
                    kind: error.kind,
                    description: error.description,
                })
            }
            _ if !status.is_success() => Err(LipsyncError::Api(format!(
                "Job submission failed with status {}: {}",
                status, body
            ))),
            Some(SubmitResponse {
                success: true,
                data: Some(data),
                ..
            }) => {
                log::info!("Job submitted, id: {}", data.uuid);
                Ok(data.uuid)
            }
            _ => Err(LipsyncError::Api(format!(
                "Unexpected job submission response: {}",
                body
            ))),
        }
    }

    /// Fetch the current status of a job.
    ///
    /// # Errors
    ///
    /// Returns `Http` if the request fails, or `Api` for a non-2xx response
    /// or a `COMPLETED` status without a result URL.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus, LipsyncError> {
        let url = format!("{}{}/{}", self.base_url, JOBS_PATH, job_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LipsyncError::Api(format!(
                "Status check failed with status {}: {}",
                status, error_text
            )));
        }

        let status_response: StatusResponse = response.json().await?;
        let data = status_response.data;

        match data.status.to_uppercase().as_str() {
            "COMPLETED" => match data.result_url {
                Some(result_url) => Ok(JobStatus::Completed { result_url }),
                None => Err(LipsyncError::Api(
                    "Job completed but no result_url in response".to_string(),
                )),
            },
            "FAILED" => Ok(JobStatus::Failed {
                error: data.error.map(|e| match e {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
            }),
            _ => Ok(JobStatus::Waiting(data.status)),
        }
    }

    /// Download a finished result to `dest`, replacing any existing file.
    ///
    /// The body is streamed into a `.part` file next to `dest`, which is
    /// renamed over `dest` only once the whole body is on disk. A failed
    /// download leaves any previous `dest` untouched. No auth header is sent
    /// since result URLs are pre-signed.
    pub async fn download_result(&self, url: &str, dest: &Path) -> Result<PathBuf, LipsyncError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LipsyncError::Api(format!(
                "Result download failed with status {}: {}",
                status, error_text
            )));
        }

        let partial = partial_path(dest);
        let written = match write_body(response, &partial).await {
            Ok(()) => tokio::fs::rename(&partial, dest).await.map_err(LipsyncError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            log::warn!("Discarding incomplete download {:?}: {}", partial, e);
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        Ok(dest.to_path_buf())
    }

    /// Poll a job until it reaches a terminal state, then download the result.
    ///
    /// `on_status` sees every observed status before it is acted on.
    /// Non-terminal statuses wait `options.interval` and poll again. If `cancel`
    /// fires, the sleep or the in-flight status or download request is
    /// abandoned and no partial file is left behind.
    ///
    /// # Errors
    ///
    /// Any status or download error ends the wait immediately (there is no
    /// retry). `Timeout` is returned once `options.timeout` has elapsed
    /// without a terminal status.
    pub async fn wait_for_job<F>(
        &self,
        job_id: &str,
        dest: &Path,
        options: &PollOptions,
        cancel: &CancelToken,
        mut on_status: F,
    ) -> Result<JobOutcome, LipsyncError>
    where
        F: FnMut(&JobStatus),
    {
        let started = Instant::now();

        loop {
            if cancel.is_cancelled() {
                log::info!("Wait for job {} cancelled", job_id);
                return Ok(JobOutcome::Cancelled);
            }

            log::debug!("Checking job ('{}') status...", job_id);
            let status = tokio::select! {
                status = self.job_status(job_id) => status?,
                _ = cancel.cancelled() => {
                    log::info!("Wait for job {} cancelled", job_id);
                    return Ok(JobOutcome::Cancelled);
                }
            };
            on_status(&status);

            match status {
                JobStatus::Completed { result_url } => {
                    log::info!("Job {} completed, downloading {}", job_id, result_url);
                    let path = tokio::select! {
                        path = self.download_result(&result_url, dest) => path?,
                        _ = cancel.cancelled() => {
                            log::info!("Download for job {} cancelled", job_id);
                            let _ = tokio::fs::remove_file(partial_path(dest)).await;
                            return Ok(JobOutcome::Cancelled);
                        }
                    };
                    log::info!("Result written to {:?}", path);
                    return Ok(JobOutcome::Completed(path));
                }
                JobStatus::Failed { error } => {
                    log::error!("Job {} failed: {:?}", job_id, error);
                    return Ok(JobOutcome::Failed { error });
                }
                JobStatus::Waiting(raw) => {
                    log::debug!("Job {} status: {}", job_id, raw);
                }
            }

            let mut delay = options.interval;
            if let Some(timeout) = options.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    log::error!("Job {} not finished after {:?}", job_id, timeout);
                    return Err(LipsyncError::Timeout(timeout));
                }
                delay = delay.min(timeout - elapsed);
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    log::info!("Wait for job {} cancelled", job_id);
                    return Ok(JobOutcome::Cancelled);
                }
            }
        }
    }
}

/// Sibling of `dest` that an in-progress download is written to.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_OUTPUT_FILE));
    name.push(".part");
    dest.with_file_name(name)
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<(), LipsyncError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Errors that can occur during lip-sync operations.
#[derive(Debug, thiserror::Error)]
pub enum LipsyncError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Unsupported file format for face input: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("API Error: '{kind}' Description: '{description}'.")]
    Rejected {
        /// Server-supplied error type
        kind: String,
        /// Server-supplied description
        description: String,
    },

    #[error("Job did not finish within {0:?}")]
    Timeout(Duration),
}
