use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Hard ceiling on the number of results a single search may return.
pub const MAX_MATCH_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
    /// Catalog store (Supabase) configuration
    pub catalog: CatalogConfig,
    /// Embedding and generation provider configuration
    pub llm: LlmConfig,
    /// Fixed similarity-search parameters
    pub search: SearchConfig,
    /// Outbound HTTP timeouts and retry policy
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Project URL, e.g. "https://xyz.supabase.co"
    pub url: String,
    /// Service or anon key, sent as both `apikey` and bearer token
    #[serde(skip_serializing)]
    pub key: Option<String>,
    /// Table holding the game rows
    pub table: String,
    /// Stored procedure performing the vector similarity search
    pub match_function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for result formatting
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Similarity threshold and result cap. Deployment settings, never request fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub match_threshold: f32,
    pub match_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_initial_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            catalog: CatalogConfig::default(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: None,
            table: "games".to_string(),
            match_function: "match_games".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            chat_model: "gemini-1.5-flash".to_string(),
            embedding_model: "gemini-embedding-001".to_string(),
            api_key: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.3,
            match_count: MAX_MATCH_COUNT,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 30,
            max_retries: 1,
            retry_initial_delay_ms: 250,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparsable numbers keep their defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = var("PORT") {
            config.bind_addr = format!("0.0.0.0:{}", port.trim());
        }
        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(origins) = var("FRONTEND_URL") {
            config.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        // Catalog store
        if let Some(url) = var("SUPABASE_URL") {
            config.catalog.url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = var("SUPABASE_KEY") {
            config.catalog.key = Some(key);
        }
        if let Some(table) = var("CATALOG_TABLE") {
            config.catalog.table = table;
        }
        if let Some(function) = var("CATALOG_MATCH_FUNCTION") {
            config.catalog.match_function = function;
        }

        // Providers
        if let Some(provider) = var("LLM_PROVIDER") {
            config.llm.provider = provider.to_lowercase();
        }
        if config.llm.provider == "openai" {
            config.llm.base_url = "https://api.openai.com".to_string();
            config.llm.chat_model = "gpt-4o-mini".to_string();
            config.llm.embedding_model = "text-embedding-3-small".to_string();
        }
        if let Some(url) = var("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Some(model) = var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(key) = var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }

        // Search parameters
        if let Some(v) = var("SEARCH_MATCH_THRESHOLD").and_then(|v| v.parse::<f32>().ok()) {
            config.search.match_threshold = v;
        }
        if let Some(v) = var("SEARCH_MATCH_COUNT").and_then(|v| v.parse::<usize>().ok()) {
            config.search.match_count = v.clamp(1, MAX_MATCH_COUNT);
        }

        // Outbound HTTP
        if let Some(v) = var("HTTP_CONNECT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.http.connect_timeout_secs = v;
        }
        if let Some(v) = var("HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.http.timeout_secs = v;
        }
        if let Some(v) = var("RETRY_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            config.http.max_retries = v;
        }
        if let Some(v) = var("RETRY_INITIAL_DELAY_MS").and_then(|v| v.parse().ok()) {
            config.http.retry_initial_delay_ms = v;
        }

        config
    }

    /// Fail fast on settings the server cannot run without.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.url.is_empty() {
            anyhow::bail!("SUPABASE_URL is not set");
        }
        if self.catalog.key.as_deref().unwrap_or_default().is_empty() {
            anyhow::bail!("SUPABASE_KEY is not set");
        }
        if self.llm.api_key.as_deref().unwrap_or_default().is_empty() {
            anyhow::bail!("GEMINI_API_KEY (or LLM_API_KEY) is not set");
        }
        match self.llm.provider.as_str() {
            "gemini" | "openai" => Ok(()),
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.http.max_retries,
            initial_delay: Duration::from_millis(self.http.retry_initial_delay_ms),
            ..RetryPolicy::default()
        }
    }

    /// Shared outbound client with explicit connect and total timeouts.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_secs))
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_fixed_search_constants() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.search.match_threshold, 0.3);
        assert_eq!(config.search.match_count, 5);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.http.max_retries, 1);
    }

    #[test]
    fn test_port_and_origins_from_env() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("FRONTEND_URL", "https://games.example.com/, http://localhost:5173"),
        ]));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(
            config.allowed_origins,
            vec!["https://games.example.com", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_match_count_is_clamped_and_garbage_ignored() {
        let config = Config::from_lookup(lookup(&[
            ("SEARCH_MATCH_COUNT", "50"),
            ("SEARCH_MATCH_THRESHOLD", "not-a-number"),
        ]));
        assert_eq!(config.search.match_count, MAX_MATCH_COUNT);
        assert_eq!(config.search.match_threshold, 0.3);
    }

    #[test]
    fn test_openai_provider_switches_default_models() {
        let config = Config::from_lookup(lookup(&[("LLM_PROVIDER", "OpenAI")]));
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.base_url, "https://api.openai.com");
        assert_eq!(config.llm.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(Config::from_lookup(|_| None).validate().is_err());

        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://xyz.supabase.co/"),
            ("SUPABASE_KEY", "service-key"),
            ("GEMINI_API_KEY", "gemini-key"),
        ]));
        assert_eq!(config.catalog.url, "https://xyz.supabase.co");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("SUPABASE_KEY", "k"),
            ("LLM_API_KEY", "k"),
            ("LLM_PROVIDER", "ollama"),
        ]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_keys_are_not_serialized() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_KEY", "secret-db"),
            ("GEMINI_API_KEY", "secret-llm"),
        ]));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-db"));
        assert!(!json.contains("secret-llm"));
    }
}
