use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::ProviderError;
use crate::llm::Generator;

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Text-generation client for the configured provider.
#[derive(Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpGenerator {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.config.provider.as_str() {
            "gemini" => call_gemini(&self.client, &self.config, prompt).await,
            "openai" => call_openai(&self.client, &self.config, prompt).await,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }
}

// ─── Gemini ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

async fn call_gemini(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    const SERVICE: &str = "Gemini generate API";
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        config.base_url, config.chat_model
    );

    let req = GeminiGenerateRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: prompt }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    };

    let resp = client
        .post(&url)
        .header("x-goog-api-key", config.api_key.as_deref().unwrap_or_default())
        .json(&req)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            service: SERVICE,
            source,
        })
        .context("Failed to call Gemini generate API")?;
    let resp = ProviderError::check(SERVICE, resp).await?;

    let body: GeminiGenerateResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::decode(SERVICE, e))?;

    // A blocked or empty candidate is a failed call, not an empty answer.
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        anyhow::bail!("Gemini returned no text candidates");
    }
    Ok(text)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: String,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

async fn call_openai(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    const SERVICE: &str = "OpenAI chat API";
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: vec![OpenAiMessage {
            role: "user",
            content: prompt,
        }],
        temperature: TEMPERATURE,
        max_tokens: MAX_OUTPUT_TOKENS,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            service: SERVICE,
            source,
        })
        .context("Failed to call OpenAI chat API")?;
    let resp = ProviderError::check(SERVICE, resp).await?;

    let body: OpenAiChatResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::decode(SERVICE, e))?;

    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI returned no choices")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, base_url: String) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            base_url,
            chat_model: "chat-model".to_string(),
            embedding_model: "embed".to_string(),
            api_key: Some("test-key".to_string()),
        }
    }

    #[tokio::test]
    async fn test_gemini_generate_joins_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/chat-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "pick games"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"```json\n["},{"text":"]\n```"}]}}]}"#,
            )
            .create_async()
            .await;

        let generator = HttpGenerator::new(reqwest::Client::new(), config("gemini", server.url()));
        let text = generator.generate("pick games").await.unwrap();

        assert_eq!(text, "```json\n[]\n```");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_without_candidates_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/chat-model:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let generator = HttpGenerator::new(reqwest::Client::new(), config("gemini", server.url()));
        assert!(generator.generate("x").await.is_err());
    }

    #[tokio::test]
    async fn test_openai_generate_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"[]"}}]}"#)
            .create_async()
            .await;

        let generator = HttpGenerator::new(reqwest::Client::new(), config("openai", server.url()));
        assert_eq!(generator.generate("x").await.unwrap(), "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let generator = HttpGenerator::new(reqwest::Client::new(), config("openai", server.url()));
        let err = generator.generate("x").await.unwrap_err();
        assert!(format!("{err:#}").contains("401"));
        assert!(!crate::retry::is_transient(&err));
    }
}
