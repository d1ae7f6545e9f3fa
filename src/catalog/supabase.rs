use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::config::CatalogConfig;
use crate::error::ProviderError;
use crate::models::{CatalogMatch, GameRecord};

const SERVICE: &str = "Supabase";

/// Catalog access through the Supabase PostgREST API.
#[derive(Clone)]
pub struct SupabaseCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_threshold: f32,
    match_count: usize,
}

#[derive(Serialize)]
struct EmbeddingUpdate<'a> {
    embedding: &'a [f32],
}

impl SupabaseCatalog {
    pub fn new(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.config.url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.config.key.as_deref().unwrap_or_default();
        req.header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                service: SERVICE,
                source,
            })?;
        Ok(ProviderError::check(SERVICE, resp).await?)
    }
}

#[async_trait]
impl CatalogStore for SupabaseCatalog {
    async fn search(&self, embedding: &[f32], threshold: f32, limit: usize) -> Result<Vec<CatalogMatch>> {
        let url = self.rest_url(&format!("rpc/{}", self.config.match_function));
        let body = MatchRequest {
            query_embedding: embedding,
            match_threshold: threshold,
            match_count: limit,
        };

        let resp = self
            .send(self.client.post(&url).json(&body))
            .await
            .with_context(|| format!("Failed to call {} RPC", self.config.match_function))?;

        let mut matches: Vec<CatalogMatch> = resp
            .json()
            .await
            .map_err(|e| ProviderError::decode(SERVICE, e))?;
        // The procedure should already honor match_count; never pass more downstream.
        matches.truncate(limit);
        Ok(matches)
    }

    async fn list_games(&self) -> Result<Vec<GameRecord>> {
        let url = self.rest_url(&self.config.table);
        let resp = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("select", "id,title,description"), ("order", "id.asc")]),
            )
            .await
            .with_context(|| format!("Failed to list rows of {}", self.config.table))?;

        let games = resp
            .json()
            .await
            .map_err(|e| ProviderError::decode(SERVICE, e))?;
        Ok(games)
    }

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()> {
        let url = self.rest_url(&self.config.table);
        self.send(
            self.client
                .patch(&url)
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=minimal")
                .json(&EmbeddingUpdate { embedding }),
        )
        .await
        .with_context(|| format!("Failed to store embedding for row {id}"))?;
        Ok(())
    }
}
