//! Production GraphQL implementation of [`WikiProvider`].
//!
//! One `reqwest` client, one endpoint, one bearer credential — all
//! immutable after construction, so any number of in-flight tool calls
//! may share the client.

use async_trait::async_trait;
use serde_json::{json, Value};

use wm_domain::{Error, Result};

use crate::provider::WikiProvider;
use crate::types::{CreatePageRequest, Page, PageListItem, SearchResponse, UpdatePageRequest};

const REQUEST_TIMEOUT_SECS: u64 = 30;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GraphQL documents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const PAGE_FIELDS: &str =
    "id path title description content locale isPublished createdAt updatedAt tags { tag }";

fn create_page_query() -> String {
    format!(
        "mutation ($content: String!, $description: String!, $editor: String!, \
         $isPublished: Boolean!, $isPrivate: Boolean!, $locale: String!, $path: String!, \
         $tags: [String]!, $title: String!) {{ pages {{ \
         create(content: $content, description: $description, editor: $editor, \
         isPublished: $isPublished, isPrivate: $isPrivate, locale: $locale, path: $path, \
         tags: $tags, title: $title) {{ \
         responseResult {{ succeeded errorCode slug message }} \
         page {{ {PAGE_FIELDS} }} }} }} }}"
    )
}

fn single_page_query() -> String {
    format!("query ($id: Int!) {{ pages {{ single(id: $id) {{ {PAGE_FIELDS} }} }} }}")
}

fn single_page_by_path_query() -> String {
    format!(
        "query ($path: String!, $locale: String!) {{ pages {{ \
         singleByPath(path: $path, locale: $locale) {{ {PAGE_FIELDS} }} }} }}"
    )
}

const LIST_PAGES_QUERY: &str = "query { pages { list(orderBy: TITLE) { \
    id path title description locale isPublished updatedAt } } }";

const SEARCH_PAGES_QUERY: &str = "query ($query: String!, $locale: String) { pages { \
    search(query: $query, locale: $locale) { \
    results { id title description path locale } suggestions totalHits } } }";

fn update_page_query() -> String {
    format!(
        "mutation ($id: Int!, $content: String, $description: String, \
         $isPublished: Boolean, $tags: [String], $title: String) {{ pages {{ \
         update(id: $id, content: $content, description: $description, \
         isPublished: $isPublished, tags: $tags, title: $title) {{ \
         responseResult {{ succeeded errorCode slug message }} \
         page {{ {PAGE_FIELDS} }} }} }} }}"
    )
}

const DELETE_PAGE_QUERY: &str = "mutation ($id: Int!) { pages { delete(id: $id) { \
    responseResult { succeeded errorCode slug message } } } }";

const MOVE_PAGE_QUERY: &str =
    "mutation ($id: Int!, $destinationPath: String!, $destinationLocale: String!) { pages { \
     move(id: $id, destinationPath: $destinationPath, destinationLocale: $destinationLocale) { \
     responseResult { succeeded errorCode slug message } } } }";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A Wiki.js GraphQL API client authenticated with a bearer token.
pub struct GraphQlWikiClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GraphQlWikiClient {
    pub fn new(api_url: &str, api_token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            http,
            endpoint: api_url.trim_end_matches('/').to_string(),
            token: api_token.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one GraphQL exchange and return the `data` object.
    async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "Wiki.js API returned {status}: {}",
                body.trim()
            )));
        }

        let body: Value = response.json().await.map_err(from_reqwest)?;
        extract_data(body)
    }
}

pub fn from_reqwest(e: reqwest::Error) -> Error {
    Error::Http(e.to_string())
}

// ── Response decoding helpers ──────────────────────────────────────

/// Split a GraphQL response body into data or the first reported error.
fn extract_data(body: Value) -> Result<Value> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            return Err(Error::Api(message.to_string()));
        }
    }
    match body.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ => Err(Error::Api("response contained no data".into())),
    }
}

/// Check the `responseResult` object every Wiki.js mutation carries.
fn check_response_result(payload: &Value, action: &str) -> Result<()> {
    let response_result = payload.get("responseResult");
    let succeeded = response_result
        .and_then(|r| r.get("succeeded"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if succeeded {
        return Ok(());
    }

    let message = response_result
        .and_then(|r| r.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Err(Error::Api(format!("{action} failed: {message}")))
}

fn parse_page(value: &Value, context: &str) -> Result<Page> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Api(format!("{context}: malformed page object: {e}")))
}

/// Wiki.js reports a missing page via a GraphQL error rather than a
/// null payload; fold both shapes into `None`.
fn is_missing_page_error(err: &Error) -> bool {
    match err {
        Error::Api(message) => {
            let message = message.to_ascii_lowercase();
            message.contains("does not exist") || message.contains("not found")
        }
        _ => false,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WikiProvider implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl WikiProvider for GraphQlWikiClient {
    async fn create_page(&self, req: CreatePageRequest) -> Result<Page> {
        tracing::debug!(path = %req.path, locale = %req.locale, "creating page");
        let data = self
            .execute(
                &create_page_query(),
                json!({
                    "content": req.content,
                    "description": req.description,
                    "editor": "markdown",
                    "isPublished": req.is_published,
                    "isPrivate": false,
                    "locale": req.locale,
                    "path": req.path,
                    "tags": req.tags,
                    "title": req.title,
                }),
            )
            .await?;

        let payload = &data["pages"]["create"];
        check_response_result(payload, "create")?;
        match payload.get("page") {
            Some(page) if !page.is_null() => parse_page(page, "create"),
            _ => Err(Error::Api("create succeeded but returned no page".into())),
        }
    }

    async fn page_by_id(&self, id: i64) -> Result<Page> {
        let data = self.execute(&single_page_query(), json!({ "id": id })).await?;
        match data["pages"].get("single") {
            Some(page) if !page.is_null() => parse_page(page, "get"),
            _ => Err(Error::NotFound(format!("Page not found: {id}"))),
        }
    }

    async fn page_by_path(&self, path: &str, locale: &str) -> Result<Option<Page>> {
        let result = self
            .execute(
                &single_page_by_path_query(),
                json!({ "path": path, "locale": locale }),
            )
            .await;

        match result {
            Ok(data) => match data["pages"].get("singleByPath") {
                Some(page) if !page.is_null() => Ok(Some(parse_page(page, "get")?)),
                _ => Ok(None),
            },
            Err(err) if is_missing_page_error(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_pages(&self, limit: Option<usize>) -> Result<Vec<PageListItem>> {
        let data = self.execute(LIST_PAGES_QUERY, json!({})).await?;
        let mut pages: Vec<PageListItem> = serde_json::from_value(data["pages"]["list"].clone())
            .map_err(|e| Error::Api(format!("list: malformed page list: {e}")))?;
        if let Some(limit) = limit {
            pages.truncate(limit);
        }
        Ok(pages)
    }

    async fn search_pages(&self, query: &str, locale: Option<&str>) -> Result<SearchResponse> {
        let data = self
            .execute(
                SEARCH_PAGES_QUERY,
                json!({ "query": query, "locale": locale }),
            )
            .await?;
        serde_json::from_value(data["pages"]["search"].clone())
            .map_err(|e| Error::Api(format!("search: malformed response: {e}")))
    }

    async fn update_page(&self, req: UpdatePageRequest) -> Result<Page> {
        tracing::debug!(id = req.id, "updating page");
        let data = self
            .execute(
                &update_page_query(),
                json!({
                    "id": req.id,
                    "content": req.content,
                    "description": req.description,
                    "isPublished": req.is_published,
                    "tags": req.tags,
                    "title": req.title,
                }),
            )
            .await?;

        let payload = &data["pages"]["update"];
        check_response_result(payload, "update")?;
        match payload.get("page") {
            Some(page) if !page.is_null() => parse_page(page, "update"),
            // Older Wiki.js versions omit the page from the update payload.
            _ => self.page_by_id(req.id).await,
        }
    }

    async fn delete_page(&self, id: i64) -> Result<()> {
        tracing::debug!(id, "deleting page");
        let data = self.execute(DELETE_PAGE_QUERY, json!({ "id": id })).await?;
        check_response_result(&data["pages"]["delete"], "delete")
    }

    async fn move_page(
        &self,
        id: i64,
        destination_path: &str,
        destination_locale: &str,
    ) -> Result<()> {
        tracing::debug!(id, destination = %destination_path, "moving page");
        let data = self
            .execute(
                MOVE_PAGE_QUERY,
                json!({
                    "id": id,
                    "destinationPath": destination_path,
                    "destinationLocale": destination_locale,
                }),
            )
            .await?;
        check_response_result(&data["pages"]["move"], "move")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_data_returns_data_object() {
        let body = json!({ "data": { "pages": { "list": [] } } });
        let data = extract_data(body).unwrap();
        assert!(data["pages"]["list"].is_array());
    }

    #[test]
    fn extract_data_surfaces_first_graphql_error() {
        let body = json!({
            "errors": [
                { "message": "You are not authorized" },
                { "message": "second" }
            ],
            "data": null
        });
        let err = extract_data(body).unwrap_err();
        assert!(err.to_string().contains("not authorized"));
    }

    #[test]
    fn extract_data_rejects_missing_data() {
        let err = extract_data(json!({})).unwrap_err();
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn response_result_success_passes() {
        let payload = json!({ "responseResult": { "succeeded": true } });
        assert!(check_response_result(&payload, "delete").is_ok());
    }

    #[test]
    fn response_result_failure_carries_remote_message() {
        let payload = json!({
            "responseResult": { "succeeded": false, "message": "Page already exists" }
        });
        let err = check_response_result(&payload, "create").unwrap_err();
        assert!(err.to_string().contains("create failed: Page already exists"));
    }

    #[test]
    fn response_result_missing_is_a_failure() {
        let err = check_response_result(&json!({}), "move").unwrap_err();
        assert!(err.to_string().contains("move failed"));
    }

    #[test]
    fn missing_page_errors_are_recognized() {
        assert!(is_missing_page_error(&Error::Api(
            "This page does not exist".into()
        )));
        assert!(is_missing_page_error(&Error::Api("Page Not Found".into())));
        assert!(!is_missing_page_error(&Error::Api(
            "You are not authorized".into()
        )));
        assert!(!is_missing_page_error(&Error::Http("timeout".into())));
    }

    #[test]
    fn client_normalizes_trailing_slash() {
        let client = GraphQlWikiClient::new("http://wiki.local/graphql/", "token").unwrap();
        assert_eq!(client.endpoint(), "http://wiki.local/graphql");
    }

    #[test]
    fn graphql_documents_cover_page_fields() {
        assert!(create_page_query().contains("responseResult"));
        assert!(single_page_query().contains("single(id: $id)"));
        assert!(update_page_query().contains("update(id: $id"));
        assert!(SEARCH_PAGES_QUERY.contains("totalHits"));
        assert!(MOVE_PAGE_QUERY.contains("destinationPath"));
    }
}
