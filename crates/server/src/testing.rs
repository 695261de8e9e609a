//! Shared test support: an in-memory recording [`WikiProvider`] double
//! plus small constructors for the dispatch service and session table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use wm_domain::protocol::{JsonRpcRequest, RequestId};
use wm_domain::{Error, Result};
use wm_wiki_client::{
    CreatePageRequest, Page, PageListItem, SearchResponse, SearchResult, UpdatePageRequest,
    WikiProvider,
};

use crate::runtime::{McpService, SessionManager};
use crate::state::AppState;
use crate::tools::ToolRegistry;

/// In-memory Wiki.js double. Records every provider call by name so
/// tests can assert which upstream operations were (not) issued.
pub(crate) struct MockWiki {
    pages: Mutex<HashMap<i64, Page>>,
    next_id: AtomicI64,
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<String>>,
}

impl MockWiki {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    pub fn seed_page(&self, path: &str, locale: &str, title: &str, content: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pages.lock().insert(
            id,
            Page {
                id,
                path: path.into(),
                title: title.into(),
                description: String::new(),
                content: content.into(),
                locale: locale.into(),
                is_published: true,
                created_at: None,
                updated_at: None,
                tags: Vec::new(),
            },
        );
        id
    }

    /// Make the next provider call fail with the given message.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock() = Some(message.to_string());
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) -> Result<()> {
        self.calls.lock().push(name);
        match self.fail_next.lock().take() {
            Some(message) => Err(Error::Api(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WikiProvider for MockWiki {
    async fn create_page(&self, req: CreatePageRequest) -> Result<Page> {
        self.record("create_page")?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let page = Page {
            id,
            path: req.path,
            title: req.title,
            description: req.description,
            content: req.content,
            locale: req.locale,
            is_published: req.is_published,
            created_at: None,
            updated_at: None,
            tags: req
                .tags
                .into_iter()
                .map(|tag| wm_wiki_client::types::PageTag { tag })
                .collect(),
        };
        self.pages.lock().insert(id, page.clone());
        Ok(page)
    }

    async fn page_by_id(&self, id: i64) -> Result<Page> {
        self.record("page_by_id")?;
        self.pages
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Page not found: {id}")))
    }

    async fn page_by_path(&self, path: &str, locale: &str) -> Result<Option<Page>> {
        self.record("page_by_path")?;
        Ok(self
            .pages
            .lock()
            .values()
            .find(|p| p.path == path && p.locale == locale)
            .cloned())
    }

    async fn list_pages(&self, limit: Option<usize>) -> Result<Vec<PageListItem>> {
        self.record("list_pages")?;
        let mut items: Vec<PageListItem> = self
            .pages
            .lock()
            .values()
            .map(|p| PageListItem {
                id: p.id,
                path: p.path.clone(),
                title: p.title.clone(),
                description: Some(p.description.clone()),
                locale: p.locale.clone(),
                is_published: p.is_published,
                updated_at: None,
            })
            .collect();
        items.sort_by(|a, b| a.title.cmp(&b.title));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    async fn search_pages(&self, query: &str, locale: Option<&str>) -> Result<SearchResponse> {
        self.record("search_pages")?;
        let query = query.to_ascii_lowercase();
        let results: Vec<SearchResult> = self
            .pages
            .lock()
            .values()
            .filter(|p| locale.map_or(true, |l| p.locale == l))
            .filter(|p| {
                p.title.to_ascii_lowercase().contains(&query)
                    || p.content.to_ascii_lowercase().contains(&query)
            })
            .map(|p| SearchResult {
                id: p.id.to_string(),
                title: p.title.clone(),
                description: p.description.clone(),
                path: p.path.clone(),
                locale: p.locale.clone(),
            })
            .collect();
        Ok(SearchResponse {
            total_hits: results.len() as i64,
            suggestions: Vec::new(),
            results,
        })
    }

    async fn update_page(&self, req: UpdatePageRequest) -> Result<Page> {
        self.record("update_page")?;
        let mut pages = self.pages.lock();
        let page = pages
            .get_mut(&req.id)
            .ok_or_else(|| Error::NotFound(format!("Page not found: {}", req.id)))?;
        if let Some(content) = req.content {
            page.content = content;
        }
        if let Some(title) = req.title {
            page.title = title;
        }
        if let Some(description) = req.description {
            page.description = description;
        }
        if let Some(is_published) = req.is_published {
            page.is_published = is_published;
        }
        if let Some(tags) = req.tags {
            page.tags = tags
                .into_iter()
                .map(|tag| wm_wiki_client::types::PageTag { tag })
                .collect();
        }
        Ok(page.clone())
    }

    async fn delete_page(&self, id: i64) -> Result<()> {
        self.record("delete_page")?;
        self.pages
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Page not found: {id}")))
    }

    async fn move_page(
        &self,
        id: i64,
        destination_path: &str,
        destination_locale: &str,
    ) -> Result<()> {
        self.record("move_page")?;
        let mut pages = self.pages.lock();
        let page = pages
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Page not found: {id}")))?;
        page.path = destination_path.to_string();
        page.locale = destination_locale.to_string();
        Ok(())
    }
}

// ── Constructors ───────────────────────────────────────────────────

pub(crate) fn mock_service() -> (McpService, Arc<MockWiki>) {
    let wiki = Arc::new(MockWiki::new());
    let service = McpService::new(ToolRegistry::new(), wiki.clone());
    (service, wiki)
}

pub(crate) fn manager() -> SessionManager {
    let (service, _) = mock_service();
    SessionManager::new(Arc::new(service))
}

pub(crate) fn app_state() -> (AppState, Arc<MockWiki>) {
    let wiki = Arc::new(MockWiki::new());
    let service = Arc::new(McpService::new(ToolRegistry::new(), wiki.clone()));
    let sessions = Arc::new(SessionManager::new(service.clone()));
    (
        AppState {
            service,
            sessions,
            wiki_api_url: "http://wiki.test/graphql".into(),
        },
        wiki,
    )
}

pub(crate) fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest::new(RequestId::Number(id), method, params)
}
