//! The seven Wiki.js page tools.
//!
//! Pages are addressed either by numeric `id` or by `(path, locale)`.
//! Tools that mutate resolve the path form to an id first and fail with
//! a not-found error before any mutating call goes upstream.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use wm_domain::protocol::ToolDef;
use wm_domain::{Error, Result};
use wm_wiki_client::{CreatePageRequest, UpdatePageRequest, WikiProvider};

use super::PageTool;

fn default_locale() -> String {
    "en".into()
}

fn default_true() -> bool {
    true
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments(format!("invalid arguments: {e}")))
}

fn tool_def(name: &str, description: &str, input_schema: Value) -> ToolDef {
    ToolDef {
        name: name.into(),
        description: description.into(),
        input_schema,
    }
}

/// Resolve a page reference to its numeric id, without mutating anything.
async fn resolve_page_id(
    wiki: &dyn WikiProvider,
    id: Option<i64>,
    path: Option<&str>,
    locale: &str,
) -> Result<i64> {
    if let Some(id) = id {
        return Ok(id);
    }
    let Some(path) = path else {
        return Err(Error::InvalidArguments(
            "either \"id\" or \"path\" must be provided".into(),
        ));
    };
    match wiki.page_by_path(path, locale).await? {
        Some(page) => Ok(page.id),
        None => Err(Error::NotFound(format!("Page not found at path: {path}"))),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// create_page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct CreatePage;

impl CreatePage {
    pub const NAME: &'static str = "create_page";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePageArgs {
    path: String,
    title: String,
    content: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_locale")]
    locale: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_true")]
    is_published: bool,
}

#[async_trait]
impl PageTool for CreatePage {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Create a new page in Wiki.js with the given path, title and markdown content.",
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Page path (e.g., \"category/page-name\")" },
                    "title": { "type": "string", "description": "Page title" },
                    "content": { "type": "string", "description": "Page content in markdown" },
                    "description": { "type": "string", "description": "Short page description (optional)" },
                    "locale": { "type": "string", "description": "Page locale (e.g., \"en\", \"de\")", "default": "en" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Array of tags for the page (optional)" },
                    "isPublished": { "type": "boolean", "description": "Whether the page should be published", "default": true }
                },
                "required": ["path", "title", "content"]
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: CreatePageArgs = parse_args(args)?;
        let path = args.path.clone();
        let page = wiki
            .create_page(CreatePageRequest {
                path: args.path,
                title: args.title,
                content: args.content,
                description: args.description,
                locale: args.locale,
                tags: args.tags,
                is_published: args.is_published,
            })
            .await?;

        Ok(json!({
            "success": true,
            "message": format!("Page created successfully at {path}"),
            "page": page,
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// get_page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct GetPage;

impl GetPage {
    pub const NAME: &'static str = "get_page";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetPageArgs {
    id: Option<i64>,
    path: Option<String>,
    #[serde(default = "default_locale")]
    locale: String,
}

#[async_trait]
impl PageTool for GetPage {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Get a page from Wiki.js including its full content. Provide either id OR path+locale.",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "number", "description": "Page ID (optional if path is provided)" },
                    "path": { "type": "string", "description": "Page path (optional if id is provided)" },
                    "locale": { "type": "string", "description": "Page locale (used with path)", "default": "en" }
                }
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: GetPageArgs = parse_args(args)?;
        let page = match (args.id, args.path.as_deref()) {
            (Some(id), _) => wiki.page_by_id(id).await?,
            (None, Some(path)) => wiki
                .page_by_path(path, &args.locale)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Page not found at path: {path}")))?,
            (None, None) => {
                return Err(Error::InvalidArguments(
                    "either \"id\" or \"path\" must be provided".into(),
                ))
            }
        };

        Ok(json!({ "success": true, "page": page }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// list_pages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ListPages;

impl ListPages {
    pub const NAME: &'static str = "list_pages";
}

#[derive(Debug, Deserialize)]
struct ListPagesArgs {
    limit: Option<usize>,
}

#[async_trait]
impl PageTool for ListPages {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "List pages in Wiki.js, ordered by title.",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "number", "description": "Maximum number of pages to return (optional)" }
                }
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: ListPagesArgs = parse_args(args)?;
        let pages = wiki.list_pages(args.limit).await?;

        Ok(json!({
            "success": true,
            "total": pages.len(),
            "pages": pages,
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// search_pages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SearchPages;

impl SearchPages {
    pub const NAME: &'static str = "search_pages";
}

#[derive(Debug, Deserialize)]
struct SearchPagesArgs {
    query: String,
    locale: Option<String>,
}

#[async_trait]
impl PageTool for SearchPages {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Search for pages in Wiki.js by query string. Returns matching pages with relevance scoring.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query string" },
                    "locale": { "type": "string", "description": "Filter results by locale (optional, e.g., \"en\", \"de\")" }
                },
                "required": ["query"]
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: SearchPagesArgs = parse_args(args)?;
        let response = wiki
            .search_pages(&args.query, args.locale.as_deref())
            .await?;

        Ok(json!({
            "success": true,
            "totalHits": response.total_hits,
            "suggestions": response.suggestions,
            "results": response.results,
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// update_page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct UpdatePage;

impl UpdatePage {
    pub const NAME: &'static str = "update_page";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePageArgs {
    id: Option<i64>,
    path: Option<String>,
    #[serde(default = "default_locale")]
    locale: String,
    content: Option<String>,
    title: Option<String>,
    description: Option<String>,
    is_published: Option<bool>,
    tags: Option<Vec<String>>,
}

#[async_trait]
impl PageTool for UpdatePage {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Update an existing page in Wiki.js (content, title, description, tags, or publish status). \
             Provide either id OR path+locale to identify the page; only supplied fields change.",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "number", "description": "Page ID to update (optional if path is provided)" },
                    "path": { "type": "string", "description": "Page path (optional if id is provided)" },
                    "locale": { "type": "string", "description": "Page locale (used with path)", "default": "en" },
                    "content": { "type": "string", "description": "New page content (optional)" },
                    "title": { "type": "string", "description": "New page title (optional)" },
                    "description": { "type": "string", "description": "New page description (optional)" },
                    "isPublished": { "type": "boolean", "description": "Whether the page should be published (optional)" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Array of tags for the page (optional)" }
                }
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: UpdatePageArgs = parse_args(args)?;
        let id = resolve_page_id(wiki, args.id, args.path.as_deref(), &args.locale).await?;

        let page = wiki
            .update_page(UpdatePageRequest {
                id,
                content: args.content,
                title: args.title,
                description: args.description,
                is_published: args.is_published,
                tags: args.tags,
            })
            .await?;

        Ok(json!({
            "success": true,
            "message": format!("Page {id} updated successfully"),
            "page": page,
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// delete_page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct DeletePage;

impl DeletePage {
    pub const NAME: &'static str = "delete_page";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePageArgs {
    id: Option<i64>,
    path: Option<String>,
    #[serde(default = "default_locale")]
    locale: String,
}

#[async_trait]
impl PageTool for DeletePage {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Delete a page from Wiki.js. Provide either id OR path+locale. \
             WARNING: This action is irreversible!",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "number", "description": "Page ID to delete (optional if path is provided)" },
                    "path": { "type": "string", "description": "Page path (optional if id is provided)" },
                    "locale": { "type": "string", "description": "Page locale (used with path)", "default": "en" }
                }
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: DeletePageArgs = parse_args(args)?;
        let id = resolve_page_id(wiki, args.id, args.path.as_deref(), &args.locale).await?;

        wiki.delete_page(id).await?;

        Ok(json!({
            "success": true,
            "message": format!("Page {id} deleted successfully"),
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// move_page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct MovePage;

impl MovePage {
    pub const NAME: &'static str = "move_page";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovePageArgs {
    id: Option<i64>,
    path: Option<String>,
    #[serde(default = "default_locale")]
    locale: String,
    destination_path: String,
    #[serde(default = "default_locale")]
    destination_locale: String,
}

#[async_trait]
impl PageTool for MovePage {
    fn definition(&self) -> ToolDef {
        tool_def(
            Self::NAME,
            "Move a page to a new path in Wiki.js. Useful for reorganizing content structure. \
             Provide either id OR path+locale to identify the source page.",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "number", "description": "Page ID to move (optional if path is provided)" },
                    "path": { "type": "string", "description": "Current page path (optional if id is provided, e.g., \"osticket/api-key-wildcard\")" },
                    "locale": { "type": "string", "description": "Current page locale (required if using path, e.g., \"en\", \"de\")", "default": "en" },
                    "destinationPath": { "type": "string", "description": "New path for the page (e.g., \"new-category/page-name\")" },
                    "destinationLocale": { "type": "string", "description": "Target locale (e.g., \"en\", \"de\")", "default": "en" }
                },
                "required": ["destinationPath"]
            }),
        )
    }

    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value> {
        let args: MovePageArgs = parse_args(args)?;
        let id = resolve_page_id(wiki, args.id, args.path.as_deref(), &args.locale).await?;

        wiki.move_page(id, &args.destination_path, &args.destination_locale)
            .await?;

        Ok(json!({
            "success": true,
            "message": format!("Page {id} moved to {}", args.destination_path),
        }))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
