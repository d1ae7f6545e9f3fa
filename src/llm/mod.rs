//! Clients for the embedding and text-generation providers.
//!
//! Both sit behind object-safe traits so the search pipeline can be
//! driven by test doubles; the HTTP implementations dispatch on
//! `LlmConfig::provider` ("gemini" or "openai").

pub mod embeddings;
pub mod generate;

use async_trait::async_trait;

pub use embeddings::HttpEmbedder;
pub use generate::HttpGenerator;

/// Converts free text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Produces a free-text completion for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
