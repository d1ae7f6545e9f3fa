//! Offline seeding: compute an embedding for every catalog row from
//! `title + " " + description` and write it back. Never on the request path.

use crate::catalog::CatalogStore;
use crate::llm::Embedder;
use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub embedded: usize,
    pub failed: usize,
}

/// Embed every row. A failing row is logged and counted; the rest continue.
/// Only a failure to list the catalog aborts the run.
pub async fn seed_catalog(
    catalog: &dyn CatalogStore,
    embedder: &dyn Embedder,
    retry: &RetryPolicy,
) -> anyhow::Result<SeedReport> {
    let games = with_retry(retry, "list games", || catalog.list_games()).await?;
    tracing::info!("Embedding {} catalog rows", games.len());

    let mut report = SeedReport::default();

    for game in &games {
        tracing::info!("Embedding: {}...", game.title);
        let text = game.embedding_text();

        let result = async {
            let vector = with_retry(retry, "embedding", || embedder.embed(&text)).await?;
            with_retry(retry, "store embedding", || {
                catalog.update_embedding(game.id, &vector)
            })
            .await
        }
        .await;

        match result {
            Ok(()) => report.embedded += 1,
            Err(e) => {
                tracing::error!("Failed to embed '{}' (id {}): {e:#}", game.title, game.id);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
