//! Image generation backend.
//!
//! Talks to an Ark-compatible `images/generations` endpoint. The client
//! enforces a per-call deadline and retries transient failures a bounded
//! number of times; everything past that surfaces as an error the
//! orchestrator records against the individual shot.

use std::time::Duration;

use async_trait::async_trait;
use cineboard_models::GenerationRequest;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GenAiError, GenAiResult};
use crate::retry::{retry_async, RetryConfig};

const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the image backend.
#[derive(Debug, Clone)]
pub struct ImageGenConfig {
    /// API key (bearer token)
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model / endpoint identifier
    pub model: String,
    /// Per-call deadline
    pub timeout: Duration,
    /// Retries after the initial attempt
    pub max_retries: u32,
}

impl ImageGenConfig {
    /// Create config from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Ok(Self {
            api_key: std::env::var("VOLC_ARK_API_KEY")
                .map_err(|_| GenAiError::config_error("VOLC_ARK_API_KEY not set"))?,
            base_url: std::env::var("VOLC_ARK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("VOLC_IMAGE_ENDPOINT_ID")
                .map_err(|_| GenAiError::config_error("VOLC_IMAGE_ENDPOINT_ID not set"))?,
            timeout: Duration::from_secs(
                std::env::var("VOLC_IMAGE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_retries: 2,
        })
    }
}

/// Anything that can turn a generation request into an image URL.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenAiResult<String>;
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Ark image generation client.
pub struct ImageGenClient {
    client: Client,
    config: ImageGenConfig,
}

impl ImageGenClient {
    pub fn new(config: ImageGenConfig) -> GenAiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenAiError::Http)?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> GenAiResult<Self> {
        Self::new(ImageGenConfig::from_env()?)
    }

    async fn call_once(&self, request: &GenerationRequest) -> GenAiResult<String> {
        let url = format!("{}/images/generations", self.config.base_url);
        debug!(model = self.config.model.as_str(), size = request.size.as_str(), "requesting image");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ImageResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(GenAiError::api(status.as_u16(), message));
        }

        let parsed: ImageResponse = response.json().await?;
        if let Some(err) = parsed.error {
            return Err(GenAiError::api(status.as_u16(), err.message));
        }
        let image_url = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .ok_or(GenAiError::EmptyResponse)?;

        info!(model = self.config.model.as_str(), "image generated");
        Ok(image_url)
    }
}

#[async_trait]
impl ImageBackend for ImageGenClient {
    async fn generate(&self, request: &GenerationRequest) -> GenAiResult<String> {
        let retry = RetryConfig::new("image generation").with_max_retries(self.config.max_retries);
        retry_async(&retry, || self.call_once(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    fn config(server: &MockServer) -> ImageGenConfig {
        ImageGenConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            model: "seedream-test".to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 2,
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "seedream-test",
            "a lighthouse at dusk",
            "blurry",
            cineboard_models::AspectRatio::Widescreen.output_size(),
        )
    }

    #[tokio::test]
    async fn test_generate_returns_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"prompt": "a lighthouse at dusk", "size": "2560x1440"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"url": "https://cdn.example/img1.png"}]
            })))
            .mount(&server)
            .await;

        let client = ImageGenClient::new(config(&server)).unwrap();
        let url = client.generate(&request()).await.unwrap();
        assert_eq!(url, "https://cdn.example/img1.png");
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "prompt rejected"}
            })))
            .mount(&server)
            .await;

        let client = ImageGenClient::new(config(&server)).unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        match err {
            GenAiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "prompt rejected");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_data_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = ImageGenClient::new(config(&server)).unwrap();
        assert!(matches!(
            client.generate(&request()).await.unwrap_err(),
            GenAiError::EmptyResponse
        ));
    }

    struct FlakyOnce {
        hits: std::sync::atomic::AtomicU32,
    }

    impl Respond for FlakyOnce {
        fn respond(&self, _: &Request) -> ResponseTemplate {
            if self.hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({
                    "data": [{"url": "https://cdn.example/retry.png"}]
                }))
            }
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(FlakyOnce {
                hits: std::sync::atomic::AtomicU32::new(0),
            })
            .mount(&server)
            .await;

        let client = ImageGenClient::new(config(&server)).unwrap();
        let url = client.generate(&request()).await.unwrap();
        assert_eq!(url, "https://cdn.example/retry.png");
    }
}
