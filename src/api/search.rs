use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::SearchError;
use crate::models::{GameSummary, SearchRequest};
use crate::state::AppState;

/// POST /search - Natural-language game search:
///   1. Embed the query
///   2. Similarity search in the catalog (fixed threshold and cap)
///   3. LLM formatting/re-ranking of the candidates
///   4. Fence stripping, JSON parsing, sanitizing, schema check
///
/// Missing or empty query → 400 with an error object. Any downstream
/// failure → 500 with `[]`; details only go to the server log.
pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<GameSummary>>, SearchError> {
    let span = tracing::info_span!("search", request_id = %Uuid::new_v4());

    async move {
        let query = match body {
            Ok(Json(req)) => req.query.unwrap_or_default(),
            Err(rejection) => {
                tracing::debug!("Rejected search body: {rejection}");
                String::new()
            }
        };

        match state.search.search(&query).await {
            Ok(results) => {
                tracing::info!("Search for '{}' returned {} results", query.trim(), results.len());
                Ok(Json(results))
            }
            Err(SearchError::EmptyQuery) => {
                tracing::debug!("Search rejected: empty query");
                Err(SearchError::EmptyQuery)
            }
            Err(e) => {
                tracing::error!("Search for '{}' failed: {e:#}", query.trim());
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
