//! Stdio entry adapter — one implicit session for the process lifetime.
//!
//! Each JSON-RPC message is a single newline-delimited line on
//! stdin/stdout. Protocol traffic owns both streams exclusively; all
//! diagnostics go to stderr via `tracing`.

use std::io::ErrorKind;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use wm_domain::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId, PARSE_ERROR};
use wm_domain::Result;

use crate::runtime::McpService;
use crate::shutdown::shutdown_signal;

/// Run the stdio transport until EOF, a signal, or a broken pipe.
pub async fn serve(service: Arc<McpService>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            _ = shutdown_signal() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let outbound = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                        Ok(request) => service.handle(request).await,
                        Err(e) => {
                            // Framing-level failure: answer with a parse
                            // error, keep the transport alive.
                            tracing::warn!(error = %e, "malformed JSON-RPC line");
                            Some(JsonRpcResponse::error(
                                RequestId::Null,
                                PARSE_ERROR,
                                format!("parse error: {e}"),
                            ))
                        }
                    };
                    if let Some(response) = outbound {
                        if !write_response(&mut stdout, &response).await {
                            break;
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("stdin closed, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read stdin");
                    break;
                }
            },
        }
    }

    Ok(())
}

/// Write one response line. Returns `false` when the transport is gone.
/// A broken pipe is the expected peer-disconnect signal and is not an
/// error.
async fn write_response(stdout: &mut tokio::io::Stdout, response: &JsonRpcResponse) -> bool {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            return true;
        }
    };

    let write = async {
        stdout.write_all(json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await
    };

    match write.await {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            tracing::debug!("stdout closed by peer");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to write response");
            false
        }
    }
}
