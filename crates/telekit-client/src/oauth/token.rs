//! OAuth token types
//!
//! Token parsing from the platform's token endpoint and expiry metadata.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access token issued by the platform's token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API calls
    pub access_token: String,

    /// Token type (the platform issues "bearer")
    pub token_type: String,

    /// Refresh token for getting new access tokens
    pub refresh_token: Option<String>,

    /// Token expiry time
    pub expires_at: Option<DateTime<Utc>>,

    /// Scopes granted
    #[serde(default)]
    pub scope: Option<String>,
}

/// Raw token response from the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl From<TokenResponse> for OAuthToken {
    fn from(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_at,
            scope: response.scope,
        }
    }
}

impl OAuthToken {
    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false, // No expiry = never expires
        }
    }

    /// Check if the token will expire soon (within buffer time)
    pub fn expires_soon(&self, buffer_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(buffer_seconds) >= expires_at,
            None => false,
        }
    }

    /// Check if the token can be refreshed
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Get the authorization header value
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Get scopes as a vector
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_ref()
            .map(|s| s.split(',').map(String::from).collect())
            .unwrap_or_default()
    }
}
