//! Command-line interface.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wikijs-mcp",
    version,
    about = "MCP server exposing Wiki.js page tools over stdio or HTTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve MCP over HTTP (streamable transport with SSE sessions).
    Serve,
    /// Serve MCP over stdio (the default; for local editor spawning).
    Stdio,
}
