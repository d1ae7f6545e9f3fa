use std::sync::Arc;

use serde_json::Value;

use crate::catalog::CatalogStore;
use crate::config::{SearchConfig, MAX_MATCH_COUNT};
use crate::error::{SearchError, Stage};
use crate::llm::{Embedder, Generator};
use crate::models::GameSummary;
use crate::retry::{with_retry, RetryPolicy};
use crate::sanitize::{sanitize, strip_code_fences};
use crate::search::prompt::build_ranking_prompt;

/// Queries longer than this are cut before they reach any provider.
const MAX_QUERY_CHARS: usize = 500;

/// The search orchestrator: embedding → similarity search → generation → cleanup.
///
/// Holds no per-request state; concurrent searches share only the
/// read-only catalog and the stateless providers.
#[derive(Clone)]
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<dyn CatalogStore>,
    generator: Arc<dyn Generator>,
    settings: SearchConfig,
    retry: RetryPolicy,
}

impl SearchService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        catalog: Arc<dyn CatalogStore>,
        generator: Arc<dyn Generator>,
        settings: SearchConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            embedder,
            catalog,
            generator,
            settings,
            retry,
        }
    }

    fn limit(&self) -> usize {
        self.settings.match_count.clamp(1, MAX_MATCH_COUNT)
    }

    /// Run the whole pipeline for one query. The three external calls are
    /// strictly sequential and any failure aborts the request.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<GameSummary>, SearchError> {
        let query = normalize_query(raw_query).ok_or(SearchError::EmptyQuery)?;
        let limit = self.limit();

        let embedding = with_retry(&self.retry, "embedding", || self.embedder.embed(&query))
            .await
            .map_err(|source| SearchError::Upstream {
                stage: Stage::Embedding,
                source,
            })?;

        let threshold = self.settings.match_threshold;
        let candidates = with_retry(&self.retry, "catalog search", || {
            self.catalog.search(&embedding, threshold, limit)
        })
        .await
        .map_err(|source| SearchError::Upstream {
            stage: Stage::Catalog,
            source,
        })?;

        tracing::debug!("{} catalog candidates for '{query}'", candidates.len());
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_ranking_prompt(&query, &candidates, limit);
        let raw = with_retry(&self.retry, "generation", || self.generator.generate(&prompt))
            .await
            .map_err(|source| SearchError::Upstream {
                stage: Stage::Generation,
                source,
            })?;

        parse_generated_results(&raw, limit)
    }
}

/// Trim the query and cap its length; `None` when nothing is left.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_QUERY_CHARS).collect())
}

/// Fence-strip, parse, sanitize and schema-check the generation output.
pub fn parse_generated_results(raw: &str, limit: usize) -> Result<Vec<GameSummary>, SearchError> {
    let stripped = strip_code_fences(raw);
    let parsed: Value = serde_json::from_str(&stripped).map_err(SearchError::MalformedJson)?;
    let cleaned = sanitize(parsed);

    let items = match cleaned {
        Value::Array(items) => items,
        other => {
            return Err(SearchError::UnexpectedShape(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut results = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<GameSummary>(item)
                .map_err(|e| SearchError::UnexpectedShape(format!("element {i}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    results.truncate(limit);
    Ok(results)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
