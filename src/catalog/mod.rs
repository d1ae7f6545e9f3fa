//! The game catalog: a hosted Postgres table with precomputed embeddings
//! and a stored procedure for vector similarity search.

pub mod supabase;

use async_trait::async_trait;

use crate::models::{CatalogMatch, GameRecord};

pub use supabase::SupabaseCatalog;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Records whose embedding similarity to `embedding` is above `threshold`,
    /// best match first, at most `limit` of them.
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogMatch>>;

    /// Every catalog row, without embeddings. Used by the offline seeder.
    async fn list_games(&self) -> anyhow::Result<Vec<GameRecord>>;

    /// Overwrite the stored embedding of one row.
    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> anyhow::Result<()>;
}
