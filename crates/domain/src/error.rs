/// Shared error type used across all wikijs-mcp crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("Wiki.js API: {0}")]
    Api(String),

    /// Lookup failures (page id / path). The message is surfaced verbatim
    /// to MCP callers, so it must be self-describing.
    #[error("{0}")]
    NotFound(String),

    #[error("config: {0}")]
    Config(String),

    /// Malformed or incomplete tool arguments.
    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
