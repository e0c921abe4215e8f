//! Script decomposition via a chat-completion model.
//!
//! The director turns free-form script text into an ordered list of
//! panels, each carrying a description, a visual prompt and a loose
//! framing token. Models wrap their JSON in markdown fences or return a
//! bare array instead of the documented envelope; the parser tolerates
//! both. Anything it still cannot parse is an `Analysis` error, which the
//! orchestrator treats as fatal for the whole request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{GenAiError, GenAiResult};
use crate::retry::{retry_async, RetryConfig};

const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 45;

const SYSTEM_PROMPT: &str = "You are a professional film storyboard director. Decompose the script into a sequence of key shots. \
Output pure JSON only, shaped as {\"panels\": [{\"description\": \"...\", \"visualPrompt\": \"...\", \"shotType\": \"...\"}]}. \
Each panel carries: description (a detailed visual account of the frame), visualPrompt (an English image-generation prompt with lighting, environment and action detail), \
and shotType (one of \"Extreme Wide Shot\", \"Wide Shot\", \"Full Shot\", \"Medium Shot\", \"Close-up\", \"Extreme Close-up\"). \
Do not include explanations or markdown fences.";

/// Configuration for the director backend.
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl DirectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Ok(Self {
            api_key: std::env::var("VOLC_ARK_API_KEY")
                .map_err(|_| GenAiError::config_error("VOLC_ARK_API_KEY not set"))?,
            base_url: std::env::var("VOLC_ARK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("VOLC_TEXT_ENDPOINT_ID")
                .map_err(|_| GenAiError::config_error("VOLC_TEXT_ENDPOINT_ID not set"))?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// One panel from script decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptPanel {
    pub description: String,
    #[serde(rename = "visualPrompt", default)]
    pub visual_prompt: String,
    #[serde(rename = "shotType", default)]
    pub shot_type: String,
}

/// Anything that can decompose a script into panels.
#[async_trait]
pub trait ScriptDirector: Send + Sync {
    async fn decompose(&self, script: &str) -> GenAiResult<Vec<ScriptPanel>>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<ChatErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PanelsEnvelope {
    panels: Vec<ScriptPanel>,
}

/// Strips markdown fences and surrounding prose from a model reply,
/// leaving the JSON payload.
fn clean_json_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Parses the cleaned payload, accepting both the documented envelope and
/// a bare panel array.
fn parse_panels(payload: &str) -> GenAiResult<Vec<ScriptPanel>> {
    if let Ok(envelope) = serde_json::from_str::<PanelsEnvelope>(payload) {
        return Ok(envelope.panels);
    }
    if let Ok(panels) = serde_json::from_str::<Vec<ScriptPanel>>(payload) {
        return Ok(panels);
    }
    Err(GenAiError::analysis(format!(
        "response is not a panel list: {}",
        payload.chars().take(120).collect::<String>()
    )))
}

/// Ark chat-completions director client.
pub struct DirectorClient {
    client: Client,
    config: DirectorConfig,
}

impl DirectorClient {
    pub fn new(config: DirectorConfig) -> GenAiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenAiError::Http)?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> GenAiResult<Self> {
        Self::new(DirectorConfig::from_env()?)
    }

    async fn call_once(&self, script: &str) -> GenAiResult<Vec<ScriptPanel>> {
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(model = self.config.model.as_str(), script_len = script.len(), "decomposing script");

        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("Decompose the following script:\n\n{script}")}
            ],
            "temperature": 0.6,
            "max_tokens": 4000
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: ChatResponse = response.json().await?;
        if !status.is_success() {
            let message = parsed
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(GenAiError::api(status.as_u16(), message));
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenAiError::EmptyResponse)?;

        let panels = parse_panels(clean_json_payload(&content))?;
        if panels.is_empty() {
            return Err(GenAiError::analysis("decomposition produced no panels"));
        }

        info!(panel_count = panels.len(), "script decomposed");
        Ok(panels)
    }
}

#[async_trait]
impl ScriptDirector for DirectorClient {
    async fn decompose(&self, script: &str) -> GenAiResult<Vec<ScriptPanel>> {
        let retry = RetryConfig::new("script decomposition");
        retry_async(&retry, || self.call_once(script)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> DirectorConfig {
        DirectorConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            model: "director-test".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn chat_reply(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"content": content}}]})
    }

    #[test]
    fn test_clean_strips_markdown_fences() {
        assert_eq!(clean_json_payload("```json\n{\"panels\":[]}\n```"), "{\"panels\":[]}");
        assert_eq!(clean_json_payload("```\n[1]\n```"), "[1]");
        assert_eq!(clean_json_payload("  {\"panels\":[]}  "), "{\"panels\":[]}");
    }

    #[test]
    fn test_parse_accepts_bare_array() {
        let panels = parse_panels(r#"[{"description": "d", "visualPrompt": "v", "shotType": "Close-up"}]"#).unwrap();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].shot_type, "Close-up");
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            parse_panels("Sure! Here are your panels."),
            Err(GenAiError::Analysis(_))
        ));
    }

    #[tokio::test]
    async fn test_decompose_parses_fenced_envelope() {
        let server = MockServer::start().await;
        let content = "```json\n{\"panels\": [\
            {\"description\": \"a man enters\", \"visualPrompt\": \"man entering a dim bar\", \"shotType\": \"Wide Shot\"},\
            {\"description\": \"his eyes\", \"visualPrompt\": \"close on weathered eyes\", \"shotType\": \"Close-up\"}\
        ]}\n```";
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .mount(&server)
            .await;

        let client = DirectorClient::new(config(&server)).unwrap();
        let panels = client.decompose("a man enters a bar").await.unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[1].visual_prompt, "close on weathered eyes");
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_analysis_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("I could not do that.")))
            .mount(&server)
            .await;

        let client = DirectorClient::new(config(&server)).unwrap();
        assert!(matches!(
            client.decompose("script").await.unwrap_err(),
            GenAiError::Analysis(_)
        ));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "invalid key"}
            })))
            .mount(&server)
            .await;

        let client = DirectorClient::new(config(&server)).unwrap();
        match client.decompose("script").await.unwrap_err() {
            GenAiError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
