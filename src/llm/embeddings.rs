use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::ProviderError;
use crate::llm::Embedder;

/// Maximum characters to send per text to the embedding API.
/// gemini-embedding-001 accepts 2 048 tokens; catalog descriptions are far
/// shorter, so this only guards against pathological queries.
const MAX_EMBED_CHARS: usize = 6_000;

/// Truncate `text` to at most `MAX_EMBED_CHARS`, splitting on a UTF-8 char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Embedding client for the configured provider.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpEmbedder {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = truncate_for_embedding(text);
        let embedding = match self.config.provider.as_str() {
            "gemini" => embed_gemini(&self.client, &self.config, text).await?,
            "openai" => embed_openai(&self.client, &self.config, text).await?,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        };
        if embedding.is_empty() {
            anyhow::bail!("Embedding provider returned an empty vector");
        }
        Ok(embedding)
    }
}

// ─── Gemini ──────────────────────────────────────────────

#[derive(Serialize)]
struct GeminiEmbedRequest<'a> {
    model: String,
    content: GeminiContent<'a>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedding,
}

#[derive(Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

async fn embed_gemini(client: &reqwest::Client, config: &LlmConfig, text: &str) -> Result<Vec<f32>> {
    const SERVICE: &str = "Gemini embed API";
    let url = format!(
        "{}/v1beta/models/{}:embedContent",
        config.base_url, config.embedding_model
    );

    let req = GeminiEmbedRequest {
        model: format!("models/{}", config.embedding_model),
        content: GeminiContent {
            parts: vec![GeminiPart { text }],
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
        .context("Failed to call Gemini embed API")?;
    let resp = ProviderError::check(SERVICE, resp).await?;

    let body: GeminiEmbedResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::decode(SERVICE, e))?;

    Ok(body.embedding.values)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: String,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

async fn embed_openai(client: &reqwest::Client, config: &LlmConfig, text: &str) -> Result<Vec<f32>> {
    const SERVICE: &str = "OpenAI embed API";
    let url = format!("{}/v1/embeddings", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiEmbedRequest {
        model: config.embedding_model.clone(),
        input: vec![text],
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
        .context("Failed to call OpenAI embed API")?;
    let resp = ProviderError::check(SERVICE, resp).await?;

    let body: OpenAiEmbedResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::decode(SERVICE, e))?;

    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .context("No embedding returned")
}
