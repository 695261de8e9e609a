//! Environment-driven configuration.
//!
//! The server is configured entirely through process environment
//! variables. `WIKIJS_API_URL` and `WIKIJS_API_TOKEN` are required;
//! startup must abort with a non-zero exit when either is missing.

use crate::error::{Error, Result};

pub const ENV_API_URL: &str = "WIKIJS_API_URL";
pub const ENV_API_TOKEN: &str = "WIKIJS_API_TOKEN";
pub const ENV_HTTP_PORT: &str = "MCP_HTTP_PORT";
pub const ENV_HTTP_HOST: &str = "MCP_HTTP_HOST";

pub const DEFAULT_HTTP_PORT: u16 = 3200;
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wiki.js upstream
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Credentials and endpoint for the upstream Wiki.js GraphQL API.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    pub api_url: String,
    pub api_token: String,
}

impl WikiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Tests pass a closure over
    /// a map instead of mutating process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup(ENV_API_URL).filter(|v| !v.is_empty());
        let api_token = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty());

        match (api_url, api_token) {
            (Some(api_url), Some(api_token)) => Ok(Self { api_url, api_token }),
            (api_url, api_token) => {
                let mut missing = Vec::new();
                if api_url.is_none() {
                    missing.push(ENV_API_URL);
                }
                if api_token.is_none() {
                    missing.push(ENV_API_TOKEN);
                }
                Err(Error::Config(format!(
                    "missing required environment variable(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP listener
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bind address for the HTTP entry adapter.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.into(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(ENV_HTTP_HOST)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_HOST.into());

        let port = match lookup(ENV_HTTP_PORT).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                Error::Config(format!("{ENV_HTTP_PORT} must be a port number, got {raw:?}"))
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
