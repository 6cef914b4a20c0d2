//! Mock collaborator implementations for integration tests.
//!
//! Scripted stand-ins for the platform's token exchange so gateway tests
//! run without a network.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use telekit_client::oauth::{CodeExchanger, OAuthError, OAuthToken};

/// Build a token the way a successful exchange would
pub fn test_token(access_token: &str) -> OAuthToken {
    OAuthToken {
        access_token: access_token.to_string(),
        token_type: "bearer".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        scope: Some("DC".to_string()),
    }
}

enum ExchangeScript {
    /// Succeed with a token carrying this access token string
    Succeed(String),
    /// Fail as the platform would on a bad code
    Fail,
}

/// Scripted stand-in for the platform's code-to-token exchange.
///
/// Records every code it is asked to exchange so tests can assert the
/// exchange happened exactly once (or not at all).
pub struct ScriptedExchanger {
    script: ExchangeScript,
    codes: Mutex<Vec<String>>,
}

impl ScriptedExchanger {
    /// An exchanger that always succeeds with the given access token
    pub fn succeeding(access_token: &str) -> Self {
        Self {
            script: ExchangeScript::Succeed(access_token.to_string()),
            codes: Mutex::new(Vec::new()),
        }
    }

    /// An exchanger that always fails
    pub fn failing() -> Self {
        Self {
            script: ExchangeScript::Fail,
            codes: Mutex::new(Vec::new()),
        }
    }

    /// Codes the handler tried to exchange, in order
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeExchanger for ScriptedExchanger {
    async fn token_from_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        self.codes.lock().unwrap().push(code.to_string());

        match &self.script {
            ExchangeScript::Succeed(access_token) => Ok(test_token(access_token)),
            ExchangeScript::Fail => Err(OAuthError::Endpoint {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "invalid code".to_string(),
            }),
        }
    }
}
