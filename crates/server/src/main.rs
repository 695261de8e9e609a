use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use wm_domain::config::{HttpConfig, WikiConfig};

use wm_server::cli::{Cli, Command};
use wm_server::{api, bootstrap, shutdown, stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve) => {
            init_server_tracing();
            run_http().await
        }
        // Stdio is the default so editors can spawn the binary directly.
        None | Some(Command::Stdio) => {
            init_stdio_tracing();
            run_stdio().await
        }
    }
}

// ── Tracing setup ──────────────────────────────────────────────────
//
// Both modes log to stderr: in stdio mode stdout carries protocol
// traffic, and in HTTP mode keeping stderr for diagnostics matches the
// stdio behavior.

fn init_server_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_stdio_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ── Configuration ──────────────────────────────────────────────────

/// Load the upstream credentials, refusing to start without them.
fn load_wiki_config() -> WikiConfig {
    match WikiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            tracing::error!("please set WIKIJS_API_URL and WIKIJS_API_TOKEN");
            std::process::exit(1);
        }
    }
}

// ── Entry points ───────────────────────────────────────────────────

async fn run_http() -> anyhow::Result<()> {
    let wiki = load_wiki_config();
    let http = match HttpConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let state = bootstrap::build_app_state(&wiki)?;
    let app = api::router(state.clone());

    let addr = http.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Wiki.js MCP HTTP server");
    tracing::info!("  listening on http://{addr}");
    tracing::info!("  MCP endpoint:  http://{addr}/mcp");
    tracing::info!("  health check:  http://{addr}/health");
    tracing::info!("  Wiki.js API:   {}", wiki.api_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .context("axum server error")?;

    // The listener is gone; close every live session before exiting.
    state.sessions.shutdown();
    tracing::info!("shutdown complete");

    Ok(())
}

async fn run_stdio() -> anyhow::Result<()> {
    let wiki = load_wiki_config();
    let state = bootstrap::build_app_state(&wiki)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %wiki.api_url,
        "Wiki.js MCP server running on stdio"
    );

    stdio::serve(state.service.clone()).await?;
    tracing::info!("shutdown complete");

    Ok(())
}
