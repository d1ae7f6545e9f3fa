use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure of a single outbound call to a provider or the catalog.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{service} response could not be decoded: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProviderError {
    /// Timeouts, connection failures, 408, 429 and 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => {
                status.is_server_error()
                    || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || *status == reqwest::StatusCode::REQUEST_TIMEOUT
            }
            Self::Decode { .. } => false,
        }
    }

    /// Wrap a body decoding failure, keeping its cause chain for the log.
    pub fn decode(
        service: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            service,
            source: source.into(),
        }
    }

    /// Check the HTTP status of a provider response, reading the body into the error on failure.
    pub async fn check(
        service: &'static str,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, Self> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Self::Status {
            service,
            status,
            body,
        })
    }
}

/// Which collaborator a failed search was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Catalog,
    Generation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Embedding => "embedding",
            Self::Catalog => "catalog similarity search",
            Self::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong while serving `POST /search`.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("no search query provided")]
    EmptyQuery,
    #[error("{stage} call failed: {source:#}")]
    Upstream {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
    #[error("generation output is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
    #[error("generation output does not match the result schema: {0}")]
    UnexpectedShape(String),
}

impl SearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyQuery => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        match self {
            Self::EmptyQuery => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No search query provided." })),
            )
                .into_response(),
            // Internals stay in the server log; the client only sees an empty result set.
            other => (other.status(), Json(json!([]))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(code: u16) -> ProviderError {
        ProviderError::Status {
            service: "test",
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn test_server_errors_and_rate_limits_are_transient() {
        assert!(status_error(500).is_transient());
        assert!(status_error(503).is_transient());
        assert!(status_error(429).is_transient());
        assert!(status_error(408).is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        assert!(!status_error(400).is_transient());
        assert!(!status_error(401).is_transient());
        assert!(!status_error(403).is_transient());
        let decode = ProviderError::decode("test", "bad");
        assert!(!decode.is_transient());
    }

    #[test]
    fn test_empty_query_maps_to_bad_request() {
        let resp = SearchError::EmptyQuery.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_failure_maps_to_internal_error() {
        let err = SearchError::Upstream {
            stage: Stage::Catalog,
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("catalog similarity search"));
    }
}
