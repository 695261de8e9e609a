//! `wm-domain` — shared types for the Wiki.js MCP server.
//!
//! Holds the crate-wide error type, environment-driven configuration,
//! and the JSON-RPC 2.0 / MCP protocol types used by both entry
//! adapters.

pub mod config;
pub mod error;
pub mod protocol;

pub use error::{Error, Result};
