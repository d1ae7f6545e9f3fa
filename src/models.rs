use serde::{Deserialize, Deserializer, Serialize};

/// Nullable text columns read as empty strings.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A catalog row as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rating: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl GameRecord {
    /// Text the stored embedding is derived from.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// A candidate returned by the catalog similarity search, best match first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMatch {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rating: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Similarity score; omitted from the generation prompt
    #[serde(default, skip_serializing)]
    pub similarity: Option<f32>,
}

/// A single search result as returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummary {
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub rating: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub duration: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub genre: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Search request body. `query` is optional here so a missing field
/// becomes the same 400 as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_match_tolerates_missing_fields() {
        let m: CatalogMatch =
            serde_json::from_str(r#"{"title":"Halo","similarity":0.5}"#).unwrap();
        assert_eq!(m.title, "Halo");
        assert_eq!(m.genre, "");
        assert_eq!(m.similarity, Some(0.5));
    }

    #[test]
    fn test_null_columns_read_as_empty() {
        let m: CatalogMatch = serde_json::from_str(
            r#"{"title":"Halo","rating":null,"duration":null,"genre":"FPS","description":null}"#,
        )
        .unwrap();
        assert_eq!(m.rating, "");
        assert_eq!(m.duration, "");
        assert_eq!(m.genre, "FPS");

        let record: GameRecord =
            serde_json::from_str(r#"{"id":3,"title":"Tetris","description":null}"#).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.embedding_text(), "Tetris ");
    }

    #[test]
    fn test_summary_accepts_null_but_not_missing_fields() {
        let summary: GameSummary = serde_json::from_str(
            r#"{"title":"Halo","rating":null,"duration":"10h","genre":"FPS","description":"d"}"#,
        )
        .unwrap();
        assert_eq!(summary.rating, "");

        let missing = serde_json::from_str::<GameSummary>(
            r#"{"title":"Halo","duration":"10h","genre":"FPS","description":"d"}"#,
        );
        assert!(missing.is_err());
    }

    #[test]
    fn test_catalog_match_serializes_without_similarity() {
        let m = CatalogMatch {
            title: "Halo".into(),
            rating: "T".into(),
            duration: "10h".into(),
            genre: "FPS".into(),
            description: "Great".into(),
            similarity: Some(0.9),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("similarity").is_none());
        assert_eq!(json["title"], "Halo");
    }

    #[test]
    fn test_embedding_text_joins_title_and_description() {
        let record = GameRecord {
            id: 1,
            title: "Forza Horizon 5".into(),
            rating: "E".into(),
            duration: "40h".into(),
            genre: "Racing".into(),
            description: "Open-world racing in Mexico".into(),
            embedding: None,
        };
        assert_eq!(
            record.embedding_text(),
            "Forza Horizon 5 Open-world racing in Mexico"
        );
    }

    #[test]
    fn test_search_request_missing_query_is_none() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_none());
    }
}
