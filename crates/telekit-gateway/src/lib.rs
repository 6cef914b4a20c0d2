//! Telekit Gateway
//!
//! HTTP companion server for the Telekit client SDK:
//! - OAuth consent kickoff and authorization-code callback
//! - Session-scoped token storage keyed by scope
//! - Device capability lookup for authorized sessions

pub mod callback;
pub mod server;
pub mod session;

pub use callback::{CallbackFailure, CallbackParams};
pub use server::{AppState, GatewayConfig, GatewayServer};
pub use session::{SessionStore, SessionTokens, SESSION_COOKIE};
