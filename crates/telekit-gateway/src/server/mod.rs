//! Gateway server
//!
//! HTTP server exposing the OAuth consent flow, the authorization-code
//! callback, and the device capability endpoint over an explicit routing
//! table.

mod handlers;

pub use handlers::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use telekit_client::oauth::{CodeExchanger, OAuthConfig, OAuthService};

use crate::session::SessionStore;

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS for browser access
    pub enable_cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4567,
            enable_cors: true,
        }
    }
}

impl GatewayConfig {
    /// Read overrides from TELEKIT_HOST / TELEKIT_PORT, falling back to
    /// defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("TELEKIT_HOST").unwrap_or(defaults.host),
            port: std::env::var("TELEKIT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: defaults.enable_cors,
        }
    }

    /// Get the socket address
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Get the base URL for this gateway
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Telekit gateway server.
///
/// Owns the session store and the OAuth collaborator; external behavior is
/// injected through the constructor so tests can run the router against a
/// scripted exchanger.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new gateway server
    pub fn new(config: GatewayConfig, oauth_config: OAuthConfig) -> Self {
        let http_client = reqwest::Client::new();
        let oauth = Arc::new(OAuthService::with_http_client(
            oauth_config,
            http_client.clone(),
        ));

        let state = AppState {
            sessions: Arc::new(SessionStore::new()),
            exchanger: oauth.clone(),
            oauth,
            http_client,
            base_url: config.base_url(),
        };

        Self { config, state }
    }

    /// Replace the token-exchange collaborator (tests script this seam)
    pub fn with_exchanger(mut self, exchanger: Arc<dyn CodeExchanger>) -> Self {
        self.state.exchanger = exchanger;
        self
    }

    /// Get the session store
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.state.sessions.clone()
    }

    /// Build the router: one explicit route per operation
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/oauth/authorize", get(handlers::oauth_authorize))
            .route(
                "/oauth/callback",
                get(handlers::auth_callback).post(handlers::auth_callback),
            )
            .route(
                "/api/device/capabilities",
                get(handlers::device_capabilities),
            )
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Run the gateway server
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr()?;

        info!("[Gateway] Starting on {}", addr);
        info!(
            "[Gateway] CORS: {}",
            if self.config.enable_cors {
                "enabled"
            } else {
                "disabled"
            }
        );

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("[Gateway] Ready to accept connections");

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
