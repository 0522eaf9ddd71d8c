//! Narration script generation via an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use reelforge_core::config::ProviderConfig;
use reelforge_core::constants::DISALLOWED_SCRIPT_MARKERS;
use reelforge_core::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are a creative storyteller for historical sportsfigures.";
const TEMPERATURE: f32 = 0.5;

/// Capability: turn a subject name into a short narration script.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate_script(&self, subject: &str) -> Result<String, GenerationError>;
}

// Chat completions request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Script generator backed by the DeepSeek chat-completions endpoint.
#[derive(Debug)]
pub struct DeepSeekScriptGenerator {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl DeepSeekScriptGenerator {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AppError> {
        let api_key = config
            .deepseek_api_key
            .clone()
            .ok_or_else(|| AppError::Config("DEEPSEEK_API_KEY not configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.deepseek_base_url.trim_end_matches('/').to_string(),
            model: config.script_model.clone(),
            max_tokens: config.script_max_tokens,
        })
    }

    fn build_prompt(subject: &str) -> String {
        format!(
            "Give a very short voiceover telling a story about the historical sports celebrity {}, \
             focusing on their achievements, unique qualities, and what makes them inspiring. \
             Do not mention that this is AI-generated.",
            subject
        )
    }
}

#[async_trait]
impl ScriptGenerator for DeepSeekScriptGenerator {
    #[tracing::instrument(skip(self), fields(subject = %subject, model = %self.model))]
    async fn generate_script(&self, subject: &str) -> Result<String, GenerationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GenerationError::EmptySubject);
        }

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(subject),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let script = sanitize_script(&content);
        if script.is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        tracing::info!(chars = script.len(), "Script generated");
        Ok(script)
    }
}

/// Strip lines carrying AI-disclosure boilerplate and trim the result.
///
/// The prompt instructs the model not to disclose; this is the backstop for
/// when it does anyway.
fn sanitize_script(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !DISALLOWED_SCRIPT_MARKERS
                .iter()
                .any(|marker| lower.contains(marker))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            deepseek_api_key: Some("test-key".to_string()),
            deepseek_base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    fn generator(base_url: &str) -> DeepSeekScriptGenerator {
        DeepSeekScriptGenerator::from_config(&provider_config(base_url)).unwrap()
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = provider_config("https://api.deepseek.com");
        config.deepseek_api_key = None;
        let err = DeepSeekScriptGenerator::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_sanitize_script_strips_disclosure_lines() {
        let raw = "Pel\u{e9} rose from the streets of Bauru.\nAs an AI, I must note this is fiction.\nHe won three World Cups.";
        let clean = sanitize_script(raw);
        assert!(clean.contains("Bauru"));
        assert!(clean.contains("World Cups"));
        assert!(!clean.to_lowercase().contains("as an ai"));
    }

    #[test]
    fn test_sanitize_script_empty_when_all_lines_disallowed() {
        assert_eq!(sanitize_script("This is AI-generated content."), "");
        assert_eq!(sanitize_script("   \n  "), "");
    }

    #[tokio::test]
    async fn test_generate_script_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  Serena Williams redefined tennis.  "}}
                ]
            })))
            .mount(&server)
            .await;

        let script = generator(&server.uri())
            .generate_script("Serena Williams")
            .await
            .unwrap();
        assert_eq!(script, "Serena Williams redefined tennis.");
    }

    #[tokio::test]
    async fn test_generate_script_empty_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": ""}}]
            })))
            .mount(&server)
            .await;

        let err = generator(&server.uri())
            .generate_script("Pel\u{e9}")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyContent));
    }

    #[tokio::test]
    async fn test_generate_script_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = generator(&server.uri())
            .generate_script("Pel\u{e9}")
            .await
            .unwrap_err();
        match err {
            GenerationError::Upstream { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_script_rejects_empty_subject() {
        let err = generator("http://localhost:9")
            .generate_script("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptySubject));
    }
}
