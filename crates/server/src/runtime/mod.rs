//! The protocol core: JSON-RPC dispatch and HTTP session management.

pub mod service;
pub mod session;

pub use service::McpService;
pub use session::{Session, SessionManager};
