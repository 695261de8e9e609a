//! `wm-wiki-client` — Wiki.js GraphQL client crate.
//!
//! Provides the [`WikiProvider`] trait that abstracts over the Wiki.js
//! GraphQL API, the production [`GraphQlWikiClient`] implementation, and
//! typed DTOs for pages and search results.
//!
//! The trait is the seam the tool handlers depend on: production code
//! wires in [`GraphQlWikiClient`], tests substitute a recording double.

pub mod graphql;
pub mod provider;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use graphql::GraphQlWikiClient;
pub use provider::WikiProvider;
pub use types::{
    CreatePageRequest, Page, PageListItem, SearchResponse, SearchResult, UpdatePageRequest,
};
