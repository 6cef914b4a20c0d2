//! Session-scoped token storage
//!
//! Maps each user session to the tokens granted during that session, keyed
//! by scope. Only the callback handler writes here; any handler needing a
//! token for a scope reads.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use telekit_client::oauth::OAuthToken;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "telekit.sid";

/// Tokens granted to a single user session, keyed by scope.
///
/// An explicit context object: handlers fetch it from the [`SessionStore`],
/// mutate it, and commit it back.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    tokens: HashMap<String, OAuthToken>,
}

impl SessionTokens {
    /// Store a token under a scope, overwriting any prior token for it
    pub fn set_token_for_scope(&mut self, scope: &str, token: OAuthToken) {
        debug!("[Session] Storing token for scope {:?}", scope);
        self.tokens.insert(scope.to_string(), token);
    }

    /// Get the token stored under a scope
    pub fn token_for_scope(&self, scope: &str) -> Option<&OAuthToken> {
        self.tokens.get(scope)
    }

    /// Whether any token has been stored
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// In-memory store of per-session token maps.
///
/// The lock provides the per-session read/write serialization the handlers
/// rely on. Sessions live for the lifetime of the process; there is no
/// persistence.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionTokens>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return its id
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, SessionTokens::default());
        id
    }

    /// Get a copy of a session's tokens
    pub async fn tokens(&self, id: Uuid) -> Option<SessionTokens> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Write a session's tokens back, creating the session if needed
    pub async fn commit(&self, id: Uuid, tokens: SessionTokens) {
        self.sessions.write().await.insert(id, tokens);
    }
}

/// Extract the session id from a request's Cookie header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value.trim()).ok()
        } else {
            None
        }
    })
}

/// Build the Set-Cookie value that pins a session to the browser
pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
