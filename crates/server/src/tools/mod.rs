//! Tool registry — the fixed set of Wiki.js page tools.
//!
//! Built once at startup and immutable afterwards; there is no dynamic
//! registration.

mod pages;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use wm_domain::protocol::ToolDef;
use wm_domain::Result;
use wm_wiki_client::WikiProvider;

/// One registered tool: a static descriptor plus its handler.
///
/// Handlers return the success payload; the dispatch layer converts any
/// `Err` into the soft error envelope, so a handler can never take the
/// transport down.
#[async_trait]
pub trait PageTool: Send + Sync {
    fn definition(&self) -> ToolDef;
    async fn run(&self, wiki: &dyn WikiProvider, args: Value) -> Result<Value>;
}

pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn PageTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let entries: Vec<(&'static str, Box<dyn PageTool>)> = vec![
            (pages::CreatePage::NAME, Box::new(pages::CreatePage)),
            (pages::GetPage::NAME, Box::new(pages::GetPage)),
            (pages::ListPages::NAME, Box::new(pages::ListPages)),
            (pages::SearchPages::NAME, Box::new(pages::SearchPages)),
            (pages::UpdatePage::NAME, Box::new(pages::UpdatePage)),
            (pages::DeletePage::NAME, Box::new(pages::DeletePage)),
            (pages::MovePage::NAME, Box::new(pages::MovePage)),
        ];
        Self {
            tools: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn PageTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Descriptors for capability discovery (`tools/list`).
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
