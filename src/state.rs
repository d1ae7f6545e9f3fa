use std::sync::Arc;

use crate::catalog::SupabaseCatalog;
use crate::config::Config;
use crate::llm::{HttpEmbedder, HttpGenerator};
use crate::search::SearchService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
}

impl AppState {
    /// Wire the HTTP-backed providers and catalog from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = config.http_client()?;

        let search = SearchService::new(
            Arc::new(HttpEmbedder::new(http_client.clone(), config.llm.clone())),
            Arc::new(SupabaseCatalog::new(http_client.clone(), config.catalog.clone())),
            Arc::new(HttpGenerator::new(http_client, config.llm.clone())),
            config.search.clone(),
            config.retry_policy(),
        );

        Ok(Self::with_search(search))
    }

    pub fn with_search(search: SearchService) -> Self {
        Self { search }
    }
}
