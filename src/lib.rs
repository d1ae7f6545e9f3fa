//! # game-search
//!
//! A small web service that turns a natural-language description of a
//! video game into a short ranked list of catalog entries.
//!
//! ## Pipeline
//!
//! ```text
//!        POST /search {"query": "..."}
//!                    │
//!                    ▼
//!          ┌───────────────────┐
//!          │  Validate query   │── empty ──▶ 400 {"error": ...}
//!          └─────────┬─────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │ Embedding provider│  text → vector
//!          └─────────┬─────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │ Catalog RPC       │  vector, threshold 0.3, cap 5
//!          └─────────┬─────────┘── no candidates ──▶ 200 []
//!                    ▼
//!          ┌───────────────────┐
//!          │ Generation model  │  format / re-rank as JSON
//!          └─────────┬─────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │ Strip fences,     │
//!          │ parse, sanitize,  │── any failure ──▶ 500 []
//!          │ schema check      │
//!          └─────────┬─────────┘
//!                    ▼
//!               200 [results]
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, catalog, providers and retries
//! - [`models`] - `GameRecord`, `CatalogMatch`, `GameSummary` and request types
//! - [`error`] - Provider error classification and the search error taxonomy
//! - [`retry`] - Bounded retry with exponential backoff for transient failures
//! - [`sanitize`] - Brace stripping and Markdown fence removal for model output
//! - [`llm`] - Embedding and generation clients (Gemini or OpenAI-compatible)
//! - [`catalog`] - Supabase catalog: similarity RPC, row listing, embedding write-back
//! - [`search`] - The search orchestrator and its prompt
//! - [`seed`] - Offline embedding of every catalog row
//! - [`api`] - Axum router and handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod retry;
pub mod sanitize;
pub mod search;
pub mod seed;
pub mod state;
