//! ImageClient - handles communication with the text-to-image API.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

/// Public text-to-image endpoint.
pub const DEFAULT_GENERATE_URL: &str = "https://api.cloud.gaimin.io/ai/text-2-image/generate";

/// Generation is synchronous on the server side, so allow it some time.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for image generation.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    options: &'a Map<String, Value>,
}

/// Client for the text-to-image API.
pub struct ImageClient {
    api_key: String,
    url: String,
    http_client: reqwest::Client,
}

impl ImageClient {
    /// Create a client against the public endpoint.
    pub fn with_api_key(api_key: String) -> Result<Self, ImageError> {
        Self::with_url(api_key, DEFAULT_GENERATE_URL.to_string())
    }

    /// Create a client against a custom endpoint URL.
    pub fn with_url(api_key: String, url: String) -> Result<Self, ImageError> {
        if api_key.is_empty() {
            return Err(ImageError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            url,
            http_client,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Generate an image from a prompt.
    ///
    /// Sends `{"prompt": ..., "options": ...}` with the key in `x-api-key` and
    /// returns the parsed response body unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::EmptyPrompt` for a blank prompt (nothing is sent),
    /// or `ImageError::Http` if the request fails or the server answers with a
    /// non-2xx status.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &Map<String, Value>,
    ) -> Result<Value, ImageError> {
        if prompt.trim().is_empty() {
            return Err(ImageError::EmptyPrompt);
        }

        log::info!("Requesting image generation from {}", self.url);
        log::debug!("Generation options: {}", Value::Object(options.clone()));

        let response = self
            .http_client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&GenerateRequest { prompt, options })
            .send()
            .await?;

        let response = response.error_for_status().map_err(|e| {
            log::error!("Image generation failed: {}", e);
            e
        })?;

        Ok(response.json().await?)
    }
}

/// Errors that can occur during image generation.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid options: {reason}")]
    InvalidOptions {
        /// Why the options string was rejected
        reason: String,
    },

    #[error("Empty prompt")]
    EmptyPrompt,
}
