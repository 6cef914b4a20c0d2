//! OAuth 2.0 authorization-code support
//!
//! Implements the platform's v4 OAuth endpoints: consent URL building,
//! code-to-token exchange, token refresh, and revocation.

mod token;

pub use token::{OAuthToken, TokenResponse};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Authorization (consent) endpoint path
pub const AUTHORIZE_PATH: &str = "/oauth/v4/authorize";
/// Token endpoint path
pub const TOKEN_PATH: &str = "/oauth/v4/token";
/// Token revocation endpoint path
pub const REVOKE_PATH: &str = "/oauth/v4/revoke";

/// How long the platform keeps refresh tokens alive. Metadata only; the
/// callback path never enforces expiry.
pub const REFRESH_TOKEN_EXPIRE_HOURS: i64 = 24;

/// OAuth configuration for an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Platform host (e.g., https://api.example-telco.com)
    pub api_host: String,
    /// Application key issued by the developer portal
    pub client_id: String,
    /// Application secret issued by the developer portal
    pub client_secret: String,
    /// Scopes to request consent for
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a new OAuth config with no scopes
    pub fn new(
        api_host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_host: api_host.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: Vec::new(),
        }
    }

    /// Add scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Scopes joined the way the platform expects them on the wire
    pub fn scope_param(&self) -> String {
        self.scopes.join(",")
    }
}

/// Errors from the OAuth endpoints
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Transport-level failure talking to the platform
    #[error("oauth endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("oauth endpoint returned HTTP {status}: {body}")]
    Endpoint { status: StatusCode, body: String },

    /// The token endpoint answered 2xx but the body was not a token
    #[error("could not parse token response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Exchanges an authorization code for an access token.
///
/// Seam between the gateway's callback handler and the platform; tests
/// substitute a scripted implementation.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn token_from_code(&self, code: &str) -> Result<OAuthToken, OAuthError>;
}

/// OAuth service for the platform's v4 endpoints
pub struct OAuthService {
    http_client: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthService {
    /// Create a new OAuth service
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a new OAuth service reusing an existing HTTP client
    pub fn with_http_client(config: OAuthConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// The configuration this service was built with
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the consent URL the user's browser is sent to.
    ///
    /// The platform redirects back to `redirect_uri` with a `code`
    /// parameter once the user has granted the requested `scope`.
    pub fn authorize_url(&self, redirect_uri: &str, scope: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.endpoint(AUTHORIZE_PATH))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("scope", scope);
            query.append_pair("redirect_uri", redirect_uri);
        }

        debug!("[OAuth] Built consent URL: {}", url);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// A single POST with no retries; a failed exchange means the user
    /// restarts the authorization flow.
    pub async fn token_from_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        info!("[OAuth] Exchanging authorization code for an access token");

        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ])
        .await
    }

    /// Refresh an access token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuthToken, OAuthError> {
        info!("[OAuth] Refreshing access token");

        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ])
        .await
    }

    /// Revoke an access or refresh token
    pub async fn revoke_token(
        &self,
        token: &str,
        token_type_hint: &str,
    ) -> Result<(), OAuthError> {
        info!("[OAuth] Revoking {}", token_type_hint);

        let response = self
            .http_client
            .post(self.endpoint(REVOKE_PATH))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("token", token),
                ("token_type_hint", token_type_hint),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Endpoint { status, body });
        }

        Ok(())
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<OAuthToken, OAuthError> {
        let response = self
            .http_client
            .post(self.endpoint(TOKEN_PATH))
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Endpoint { status, body });
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(OAuthError::MalformedResponse)?;

        info!("[OAuth] Token request successful");

        Ok(token.into())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_host.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CodeExchanger for OAuthService {
    async fn token_from_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        OAuthService::token_from_code(self, code).await
    }
}
