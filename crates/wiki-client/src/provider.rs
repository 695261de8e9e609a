//! The [`WikiProvider`] capability trait.

use async_trait::async_trait;

use wm_domain::Result;

use crate::types::{CreatePageRequest, Page, PageListItem, SearchResponse, UpdatePageRequest};

/// Narrow interface over the Wiki.js API consumed by the tool handlers.
///
/// Every operation is an independent request/response exchange against
/// the remote service. Failures surface as structured [`wm_domain::Error`]
/// values with human-readable messages — never panics.
#[async_trait]
pub trait WikiProvider: Send + Sync {
    /// Create a new page and return it (with its server-assigned id).
    async fn create_page(&self, req: CreatePageRequest) -> Result<Page>;

    /// Fetch a page by numeric id. Unknown ids are an error.
    async fn page_by_id(&self, id: i64) -> Result<Page>;

    /// Fetch a page by `(path, locale)`. `Ok(None)` means no page
    /// matched — callers decide whether that is an error.
    async fn page_by_path(&self, path: &str, locale: &str) -> Result<Option<Page>>;

    /// List page summaries, optionally truncated to `limit` entries.
    async fn list_pages(&self, limit: Option<usize>) -> Result<Vec<PageListItem>>;

    /// Free-text search, optionally filtered by locale.
    async fn search_pages(&self, query: &str, locale: Option<&str>) -> Result<SearchResponse>;

    /// Apply a partial update and return the resulting page.
    async fn update_page(&self, req: UpdatePageRequest) -> Result<Page>;

    /// Delete a page by id.
    async fn delete_page(&self, id: i64) -> Result<()>;

    /// Move a page to a new path/locale.
    async fn move_page(&self, id: i64, destination_path: &str, destination_locale: &str)
        -> Result<()>;
}
