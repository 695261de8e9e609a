//! Typed DTOs matching the Wiki.js GraphQL schema.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A full page as returned by `pages.single` / `pages.singleByPath` and
/// mutation payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Wiki.js returns tags as objects; `tag_names` flattens them.
    #[serde(default)]
    pub tags: Vec<PageTag>,
}

impl Page {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageTag {
    pub tag: String,
}

/// A summary row from `pages.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageListItem {
    pub id: i64,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_locale() -> String {
    "en".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One hit from `pages.search`. Wiki.js reports search result ids as
/// strings, unlike the numeric ids everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub path: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// The full `pages.search` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub total_hits: i64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mutation inputs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Input for `pages.create`.
#[derive(Debug, Clone)]
pub struct CreatePageRequest {
    pub path: String,
    pub title: String,
    pub content: String,
    pub description: String,
    pub locale: String,
    pub tags: Vec<String>,
    pub is_published: bool,
}

/// Input for `pages.update`. `None` fields are left untouched upstream.
#[derive(Debug, Clone, Default)]
pub struct UpdatePageRequest {
    pub id: i64,
    pub content: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parses_wiki_js_shape() {
        let raw = r##"{
            "id": 42,
            "path": "infra/dns",
            "title": "DNS Setup",
            "description": "Zone layout",
            "content": "# DNS",
            "locale": "en",
            "isPublished": true,
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-06-01T00:00:00.000Z",
            "tags": [{ "tag": "infra" }, { "tag": "dns" }]
        }"##;
        let page: Page = serde_json::from_str(raw).unwrap();
        assert_eq!(page.id, 42);
        assert!(page.is_published);
        assert_eq!(page.tag_names(), vec!["infra", "dns"]);
    }

    #[test]
    fn page_tolerates_missing_optional_fields() {
        let raw = r#"{ "id": 1, "path": "home", "title": "Home" }"#;
        let page: Page = serde_json::from_str(raw).unwrap();
        assert_eq!(page.locale, "en");
        assert!(page.tags.is_empty());
        assert!(page.created_at.is_none());
    }

    #[test]
    fn search_response_parses_string_ids() {
        let raw = r#"{
            "results": [
                { "id": "42", "title": "DNS Setup", "description": "", "path": "infra/dns", "locale": "en" }
            ],
            "suggestions": ["dns zones"],
            "totalHits": 1
        }"#;
        let resp: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.total_hits, 1);
        assert_eq!(resp.results[0].id, "42");
        assert_eq!(resp.suggestions, vec!["dns zones"]);
    }

    #[test]
    fn search_response_defaults_when_empty() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.total_hits, 0);
        assert!(resp.results.is_empty());
    }
}
